//! # Catalogue Entry
//!
//! Manual first-sighting paths: creating a product by hand and adding a
//! batch to an existing product, outside of purchase processing. Both use
//! the same synthetic id allocator as purchases and emit ordinary
//! write-sets.

use chrono::Utc;

use crate::error::{EngineResult, ValidationError};
use crate::expiry::ExpiryDate;
use crate::ledger;
use crate::money::Money;
use crate::numbering;
use crate::types::{Batch, GstRate, Product};
use crate::validation;
use crate::writeset::{Collection, WriteSet};

/// A manually entered product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEntry {
    pub name: String,
    pub company: String,
    pub hsn_code: String,
    pub gst: GstRate,
    pub composition: Option<String>,
    pub batches: Vec<BatchEntry>,
}

/// A manually entered batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub batch_number: String,
    pub expiry_date: ExpiryDate,
    pub stock: i64,
    pub mrp: Money,
    pub purchase_price: Money,
}

/// The result of a catalogue operation.
#[derive(Debug)]
pub struct CatalogOutcome {
    pub product: Product,
    pub write_set: WriteSet,
}

fn validate_batch_entry(entry: &BatchEntry) -> EngineResult<()> {
    validation::validate_batch_number(&entry.batch_number)?;
    validation::validate_price("mrp", entry.mrp)?;
    validation::validate_price("purchasePrice", entry.purchase_price)?;
    if entry.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into());
    }
    Ok(())
}

fn realize(entry: BatchEntry) -> Batch {
    Batch {
        id: numbering::new_batch_id(),
        batch_number: entry.batch_number.trim().to_string(),
        expiry_date: entry.expiry_date,
        stock: entry.stock,
        mrp: entry.mrp,
        purchase_price: entry.purchase_price,
    }
}

/// Creates a product from a manual catalogue entry.
///
/// Emits `{create Product}`.
pub fn add_product(entry: ProductEntry) -> EngineResult<CatalogOutcome> {
    let name = validation::validate_name("name", &entry.name)?;
    let company = validation::validate_name("company", &entry.company)?;
    validation::validate_gst(entry.gst)?;
    for batch in &entry.batches {
        validate_batch_entry(batch)?;
    }

    let now = Utc::now();
    let product = Product {
        id: numbering::new_document_id(),
        name,
        company,
        hsn_code: entry.hsn_code.trim().to_string(),
        gst: entry.gst,
        composition: entry.composition,
        batches: entry.batches.into_iter().map(realize).collect(),
        created_at: now,
        updated_at: now,
    };

    let mut write_set = WriteSet::new();
    write_set.create(Collection::Products, &product.id, &product)?;

    Ok(CatalogOutcome { product, write_set })
}

/// Adds a batch to an existing product.
///
/// The manual path refuses a duplicate batch number on the same product —
/// restocking an existing batch goes through purchase entry instead.
///
/// Emits `{update Product}`.
pub fn add_batch(product: &Product, entry: BatchEntry) -> EngineResult<CatalogOutcome> {
    validate_batch_entry(&entry)?;

    if ledger::find_by_number(&product.batches, entry.batch_number.trim()).is_some() {
        return Err(ValidationError::Duplicate {
            field: "batchNumber".to_string(),
            value: entry.batch_number.trim().to_string(),
        }
        .into());
    }

    let mut product = product.clone();
    product.batches = ledger::upsert_batch(&product.batches, realize(entry));
    product.updated_at = Utc::now();

    let mut write_set = WriteSet::new();
    write_set.update(Collection::Products, &product.id, &product)?;

    Ok(CatalogOutcome { product, write_set })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn entry() -> ProductEntry {
        ProductEntry {
            name: "Dolo 650".to_string(),
            company: "Micro Labs".to_string(),
            hsn_code: "3004".to_string(),
            gst: GstRate::from_percentage(12.0),
            composition: Some("Paracetamol 650mg".to_string()),
            batches: vec![BatchEntry {
                batch_number: "DL2701".to_string(),
                expiry_date: "2027-01".parse().unwrap(),
                stock: 50,
                mrp: Money::from_paise(3150),
                purchase_price: Money::from_paise(2200),
            }],
        }
    }

    #[test]
    fn test_add_product_creates_one_document() {
        let outcome = add_product(entry()).unwrap();
        assert_eq!(outcome.write_set.len(), 1);
        assert_eq!(outcome.product.batches.len(), 1);
        assert_eq!(outcome.product.batches[0].stock, 50);
        assert!(outcome.product.batches[0].id.starts_with("BT-"));
    }

    #[test]
    fn test_add_product_rejects_blank_name() {
        let mut bad = entry();
        bad.name = "  ".to_string();
        assert!(add_product(bad).is_err());
    }

    #[test]
    fn test_add_batch_appends() {
        let product = add_product(entry()).unwrap().product;
        let outcome = add_batch(
            &product,
            BatchEntry {
                batch_number: "DL2704".to_string(),
                expiry_date: "2027-04".parse().unwrap(),
                stock: 30,
                mrp: Money::from_paise(3150),
                purchase_price: Money::from_paise(2250),
            },
        )
        .unwrap();
        assert_eq!(outcome.product.batches.len(), 2);
    }

    #[test]
    fn test_add_batch_rejects_duplicate_number() {
        let product = add_product(entry()).unwrap().product;
        let err = add_batch(
            &product,
            BatchEntry {
                batch_number: "DL2701".to_string(),
                expiry_date: "2027-04".parse().unwrap(),
                stock: 30,
                mrp: Money::from_paise(3150),
                purchase_price: Money::from_paise(2250),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
