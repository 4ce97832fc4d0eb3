//! Copy-on-touch working view over a product snapshot.
//!
//! Both transaction engines mutate in-memory product copies and only
//! describe the final state as write operations. The snapshot itself is
//! never modified, so a failed operation leaves nothing to undo.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::EngineResult;
use crate::ledger;
use crate::types::Product;
use crate::writeset::{Collection, WriteSet};

/// Result of applying a stock delta through the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeltaOutcome {
    Applied,
    MissingProduct,
    MissingBatch,
}

/// Products touched by one transaction: read from the snapshot, copied on
/// first mutation, and finally emitted as create/update operations.
pub(crate) struct ProductSet<'a> {
    snapshot: HashMap<&'a str, &'a Product>,
    touched: BTreeMap<String, Product>,
    created: BTreeSet<String>,
    created_order: Vec<String>,
}

impl<'a> ProductSet<'a> {
    pub fn new(products: &'a [Product]) -> Self {
        ProductSet {
            snapshot: products.iter().map(|p| (p.id.as_str(), p)).collect(),
            touched: BTreeMap::new(),
            created: BTreeSet::new(),
            created_order: Vec::new(),
        }
    }

    /// Current view of a product: the working copy if touched, otherwise the
    /// snapshot entry.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.touched
            .get(id)
            .or_else(|| self.snapshot.get(id).copied())
    }

    /// Mutable working copy, created from the snapshot on first touch.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Product> {
        if !self.touched.contains_key(id) {
            let copy = (*self.snapshot.get(id)?).clone();
            self.touched.insert(id.to_string(), copy);
        }
        self.touched.get_mut(id)
    }

    /// Registers a product created by this transaction. Later lookups see it
    /// like any other touched product.
    pub fn insert_created(&mut self, product: Product) {
        let id = product.id.clone();
        self.created.insert(id.clone());
        self.created_order.push(id.clone());
        self.touched.insert(id, product);
    }

    /// Applies a stock delta to one batch, touching the product only when
    /// the batch actually exists.
    pub fn apply_delta(
        &mut self,
        product_id: &str,
        batch_id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DeltaOutcome {
        let batches = match self.get(product_id) {
            None => return DeltaOutcome::MissingProduct,
            Some(product) => match ledger::apply_delta(&product.batches, batch_id, delta) {
                None => return DeltaOutcome::MissingBatch,
                Some(batches) => batches,
            },
        };

        match self.get_mut(product_id) {
            Some(product) => {
                product.batches = batches;
                product.updated_at = now;
                DeltaOutcome::Applied
            }
            None => DeltaOutcome::MissingProduct,
        }
    }

    /// Every product touched (mutated or created) so far.
    pub fn touched(&self) -> impl Iterator<Item = &Product> {
        self.touched.values()
    }

    /// Floors every touched batch's stock at zero (purchase commit policy).
    pub fn clamp_all(&mut self) {
        for product in self.touched.values_mut() {
            product.batches = ledger::clamp_negative(&product.batches);
        }
    }

    /// Emits the touched products: creates in creation order, then updates.
    pub fn push_ops(&self, write_set: &mut WriteSet) -> EngineResult<()> {
        for id in &self.created_order {
            if let Some(product) = self.touched.get(id) {
                write_set.create(Collection::Products, id, product)?;
            }
        }
        for (id, product) in &self.touched {
            if !self.created.contains(id) {
                write_set.update(Collection::Products, id, product)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
