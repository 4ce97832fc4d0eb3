//! # Purchase Transaction Engine
//!
//! Builds the write-sets for supplier invoice entry, edit, and deletion.
//!
//! ## Line Resolution
//! Every purchase line resolves independently to exactly one of three
//! outcomes:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Three-Way Line Resolution                           │
//! │                                                                         │
//! │  isNewProduct?                                                          │
//! │   ├── yes ──► create Product with one Batch (stock = qty)               │
//! │   │                                                                     │
//! │   └── no ───► findByNumber(batchNumber) on the existing product         │
//! │                ├── hit  ──► stock += qty; mrp/purchasePrice/expiry      │
//! │                │            overwritten (last-write-wins)               │
//! │                └── miss ──► append a new Batch (stock = qty)            │
//! │                                                                         │
//! │  Either way the line is rewritten in place with the resolved            │
//! │  productId/batchId and isNewProduct cleared.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Edit = Revert, Apply, Commit
//! Batches may have moved since the purchase was saved (other sales and
//! purchases touch them), so an edit cannot diff the two purchase documents.
//! It re-derives from *current* product state: first undo the original's
//! stock effect on in-memory copies, then run fresh resolution of the
//! updated lines against those same copies, and finally clamp any negative
//! stock to zero before emitting the write-set. Purchase edits never fail
//! on stock the way bill edits do; the clamp is the documented floor.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::{EngineError, EngineResult, RevertWarning};
use crate::ledger;
use crate::money::Money;
use crate::numbering;
use crate::types::{Batch, Company, Product, Purchase, PurchaseLineItem};
use crate::validation;
use crate::working::{DeltaOutcome, ProductSet};
use crate::writeset::{Collection, WriteSet};

// =============================================================================
// Inputs and Outcome
// =============================================================================

/// A candidate purchase as collected by the entry form, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDraft {
    pub invoice_number: String,
    pub supplier_name: String,
    pub items: Vec<PurchaseLineItem>,
}

/// The result of a purchase-engine operation.
#[derive(Debug)]
pub struct PurchaseOutcome {
    pub purchase: Purchase,
    pub write_set: WriteSet,
    pub warnings: Vec<RevertWarning>,
}

// =============================================================================
// Company auto-creation
// =============================================================================

/// Companies named by new-product lines that the catalogue doesn't know
/// yet, one record per distinct name.
///
/// Matching is case-insensitive, and the dedup covers both the known
/// companies and the other lines of this same save — two new lines naming
/// "Cipla" and "CIPLA" yield one record. Runs once per purchase-save.
fn auto_companies(
    companies: &[Company],
    items: &[PurchaseLineItem],
    now: DateTime<Utc>,
) -> Vec<Company> {
    let mut seen: HashSet<String> = companies.iter().map(|c| c.name.to_lowercase()).collect();
    let mut created = Vec::new();

    for line in items.iter().filter(|l| l.is_new_product) {
        let name = line.company.trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_lowercase()) {
            created.push(Company {
                id: numbering::new_document_id(),
                name: name.to_string(),
                created_at: now,
            });
        }
    }

    created
}

// =============================================================================
// Line resolution
// =============================================================================

/// Resolves every line against the working product state, mutating stock
/// and rewriting lines with their resolved identities.
fn resolve_lines(
    set: &mut ProductSet<'_>,
    items: Vec<PurchaseLineItem>,
    now: DateTime<Utc>,
) -> EngineResult<Vec<PurchaseLineItem>> {
    let mut resolved = Vec::with_capacity(items.len());

    for mut line in items {
        if line.is_new_product {
            // Outcome 1: brand-new product with its first batch.
            let product_id = numbering::new_document_id();
            let batch_id = numbering::new_batch_id();

            set.insert_created(Product {
                id: product_id.clone(),
                name: line.product_name.trim().to_string(),
                company: line.company.trim().to_string(),
                hsn_code: line.hsn_code.trim().to_string(),
                gst: line.gst,
                composition: line.composition.clone(),
                batches: vec![Batch {
                    id: batch_id.clone(),
                    batch_number: line.batch_number.clone(),
                    expiry_date: line.expiry_date,
                    stock: line.quantity,
                    mrp: line.mrp,
                    purchase_price: line.purchase_price,
                }],
                created_at: now,
                updated_at: now,
            });

            line.product_id = Some(product_id);
            line.batch_id = Some(batch_id);
            line.is_new_product = false;
        } else {
            let product_id = line
                .product_id
                .clone()
                .ok_or_else(|| EngineError::ProductNotFound(line.product_name.clone()))?;
            let product = set
                .get_mut(&product_id)
                .ok_or_else(|| EngineError::ProductNotFound(product_id.clone()))?;

            let existing = ledger::find_by_number(&product.batches, &line.batch_number).cloned();
            match existing {
                Some(mut batch) => {
                    // Outcome 2: additive on stock, last-write-wins on
                    // pricing and expiry.
                    batch.stock += line.quantity;
                    batch.mrp = line.mrp;
                    batch.purchase_price = line.purchase_price;
                    batch.expiry_date = line.expiry_date;
                    line.batch_id = Some(batch.id.clone());
                    product.batches = ledger::upsert_batch(&product.batches, batch);
                }
                None => {
                    // Outcome 3: new batch under an existing product.
                    let batch_id = numbering::new_batch_id();
                    product.batches = ledger::upsert_batch(
                        &product.batches,
                        Batch {
                            id: batch_id.clone(),
                            batch_number: line.batch_number.clone(),
                            expiry_date: line.expiry_date,
                            stock: line.quantity,
                            mrp: line.mrp,
                            purchase_price: line.purchase_price,
                        },
                    );
                    line.batch_id = Some(batch_id);
                }
            }
            product.updated_at = now;
        }

        resolved.push(line);
    }

    Ok(resolved)
}

fn total_amount(items: &[PurchaseLineItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_cost())
}

// =============================================================================
// Add
// =============================================================================

/// Saves a fresh purchase, resolving every line against the catalogue.
///
/// Emits `{create Purchase, create/update K Products, create new Companies}`
/// as one atomic write-set.
pub fn add_purchase(
    products: &[Product],
    companies: &[Company],
    draft: PurchaseDraft,
) -> EngineResult<PurchaseOutcome> {
    validation::validate_invoice_number(&draft.invoice_number)?;
    validation::validate_purchase_lines(&draft.items)?;

    let now = Utc::now();
    let new_companies = auto_companies(companies, &draft.items, now);

    let mut set = ProductSet::new(products);
    let items = resolve_lines(&mut set, draft.items, now)?;

    let purchase = Purchase {
        id: numbering::new_document_id(),
        invoice_number: draft.invoice_number.trim().to_string(),
        supplier_name: draft.supplier_name.trim().to_string(),
        total_amount: total_amount(&items),
        items,
        created_at: now,
    };

    let mut write_set = WriteSet::new();
    write_set.create(Collection::Purchases, &purchase.id, &purchase)?;
    set.push_ops(&mut write_set)?;
    for company in &new_companies {
        write_set.create(Collection::Companies, &company.id, company)?;
    }

    Ok(PurchaseOutcome {
        purchase,
        write_set,
        warnings: Vec::new(),
    })
}

// =============================================================================
// Edit
// =============================================================================

/// Edits a committed purchase via revert-then-reapply.
///
/// - **Revert**: subtract every original line's quantity from its batch on
///   in-memory copies of the touched products. Lines whose product or batch
///   has vanished are skipped with a warning.
/// - **Apply**: run fresh three-way resolution of the updated lines against
///   those same copies, so revert and apply compose even when both stages
///   touch one batch.
/// - **Commit**: clamp any resulting negative stock to zero and emit
///   `{update Purchase, update/create K Products, create new Companies}`.
pub fn edit_purchase(
    products: &[Product],
    companies: &[Company],
    original: &Purchase,
    updated: PurchaseDraft,
) -> EngineResult<PurchaseOutcome> {
    validation::validate_invoice_number(&updated.invoice_number)?;
    validation::validate_purchase_lines(&updated.items)?;

    let now = Utc::now();
    let new_companies = auto_companies(companies, &updated.items, now);

    let mut set = ProductSet::new(products);
    let mut warnings = Vec::new();

    // Revert stage: undo the original's stock effect.
    for line in &original.items {
        let Some((product_id, batch_id)) = line.resolved_ids() else {
            warnings.push(RevertWarning::UnresolvedLine {
                batch_number: line.batch_number.clone(),
            });
            continue;
        };
        match set.apply_delta(product_id, batch_id, -line.quantity, now) {
            DeltaOutcome::Applied => {}
            DeltaOutcome::MissingProduct => warnings.push(RevertWarning::MissingProduct {
                product_id: product_id.to_string(),
                quantity: line.quantity,
            }),
            DeltaOutcome::MissingBatch => warnings.push(RevertWarning::MissingBatch {
                product_id: product_id.to_string(),
                batch_id: batch_id.to_string(),
                quantity: line.quantity,
            }),
        }
    }

    // Apply stage: fresh resolution against the reverted copies.
    let items = resolve_lines(&mut set, updated.items, now)?;

    // Commit stage: the defensive floor. Purchase edits clamp rather than
    // reject — the policy asymmetry with bill edits is intentional.
    set.clamp_all();

    let purchase = Purchase {
        id: original.id.clone(),
        invoice_number: updated.invoice_number.trim().to_string(),
        supplier_name: updated.supplier_name.trim().to_string(),
        total_amount: total_amount(&items),
        items,
        created_at: original.created_at,
    };

    let mut write_set = WriteSet::new();
    write_set.update(Collection::Purchases, &purchase.id, &purchase)?;
    set.push_ops(&mut write_set)?;
    for company in &new_companies {
        write_set.create(Collection::Companies, &company.id, company)?;
    }

    Ok(PurchaseOutcome {
        purchase,
        write_set,
        warnings,
    })
}

// =============================================================================
// Delete
// =============================================================================

/// Deletes a purchase, subtracting each line's quantity from its batch with
/// the stock clamped at zero. Lines with no resolved identity are skipped
/// with a warning.
///
/// Emits `{delete Purchase, update N Products}`.
pub fn delete_purchase(products: &[Product], purchase: &Purchase) -> EngineResult<PurchaseOutcome> {
    let now = Utc::now();
    let mut set = ProductSet::new(products);
    let mut warnings = Vec::new();

    for line in &purchase.items {
        let Some((product_id, batch_id)) = line.resolved_ids() else {
            warnings.push(RevertWarning::UnresolvedLine {
                batch_number: line.batch_number.clone(),
            });
            continue;
        };
        match set.apply_delta(product_id, batch_id, -line.quantity, now) {
            DeltaOutcome::Applied => {}
            DeltaOutcome::MissingProduct => warnings.push(RevertWarning::MissingProduct {
                product_id: product_id.to_string(),
                quantity: line.quantity,
            }),
            DeltaOutcome::MissingBatch => warnings.push(RevertWarning::MissingBatch {
                product_id: product_id.to_string(),
                batch_id: batch_id.to_string(),
                quantity: line.quantity,
            }),
        }
    }

    set.clamp_all();

    let mut write_set = WriteSet::new();
    write_set.delete(Collection::Purchases, &purchase.id);
    set.push_ops(&mut write_set)?;

    Ok(PurchaseOutcome {
        purchase: purchase.clone(),
        write_set,
        warnings,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GstRate;
    use crate::writeset::WriteOp;

    fn new_product_line(name: &str, company: &str, batch_number: &str, qty: i64) -> PurchaseLineItem {
        PurchaseLineItem {
            is_new_product: true,
            product_id: None,
            batch_id: None,
            product_name: name.to_string(),
            company: company.to_string(),
            hsn_code: "3004".to_string(),
            gst: GstRate::from_percentage(12.0),
            composition: None,
            batch_number: batch_number.to_string(),
            expiry_date: "2027-03".parse().unwrap(),
            quantity: qty,
            mrp: Money::from_paise(4500),
            purchase_price: Money::from_paise(3200),
        }
    }

    fn existing_product_line(product_id: &str, batch_number: &str, qty: i64) -> PurchaseLineItem {
        let mut line = new_product_line("", "", batch_number, qty);
        line.is_new_product = false;
        line.product_id = Some(product_id.to_string());
        line.product_name = "Existing".to_string();
        line.company = "Cipla".to_string();
        line
    }

    fn product_with_batch(id: &str, batch_id: &str, batch_number: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: "Existing".to_string(),
            company: "Cipla".to_string(),
            hsn_code: "3004".to_string(),
            gst: GstRate::from_percentage(12.0),
            composition: None,
            batches: vec![Batch {
                id: batch_id.to_string(),
                batch_number: batch_number.to_string(),
                expiry_date: "2026-10".parse().unwrap(),
                stock,
                mrp: Money::from_paise(4000),
                purchase_price: Money::from_paise(3000),
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft(invoice: &str, items: Vec<PurchaseLineItem>) -> PurchaseDraft {
        PurchaseDraft {
            invoice_number: invoice.to_string(),
            supplier_name: "Mehta Agencies".to_string(),
            items,
        }
    }

    fn product_from_op(op: &WriteOp) -> Product {
        match op {
            WriteOp::Create { body, .. } | WriteOp::Update { body, .. } => {
                serde_json::from_value(body.clone()).unwrap()
            }
            WriteOp::Delete { .. } => panic!("expected a body-carrying op"),
        }
    }

    fn updated_product(outcome: &PurchaseOutcome, product_id: &str) -> Product {
        outcome
            .write_set
            .ops()
            .iter()
            .filter(|op| op.collection() == Collection::Products && op.id() == product_id)
            .map(product_from_op)
            .next()
            .expect("product op present")
    }

    #[test]
    fn test_new_product_line_creates_product_and_resolves() {
        let outcome = add_purchase(
            &[],
            &[],
            draft("INV-88", vec![new_product_line("Azithral 500", "Alembic", "AZ1", 10)]),
        )
        .unwrap();

        let line = &outcome.purchase.items[0];
        assert!(!line.is_new_product);
        let (product_id, batch_id) = line.resolved_ids().expect("resolved");

        let product = updated_product(&outcome, product_id);
        assert_eq!(product.batches.len(), 1);
        assert_eq!(product.batches[0].id, batch_id);
        assert_eq!(product.batches[0].stock, 10);
        assert_eq!(outcome.purchase.total_amount, Money::from_paise(32000));
    }

    #[test]
    fn test_existing_batch_number_is_additive_and_overwrites_pricing() {
        let products = vec![product_with_batch("p-1", "b-1", "AZ1", 4)];
        let mut line = existing_product_line("p-1", "AZ1", 6);
        line.mrp = Money::from_paise(4800);
        line.purchase_price = Money::from_paise(3500);
        line.expiry_date = "2027-09".parse().unwrap();

        let outcome = add_purchase(&products, &[], draft("INV-1", vec![line])).unwrap();

        let product = updated_product(&outcome, "p-1");
        assert_eq!(product.batches.len(), 1);
        assert_eq!(product.batches[0].stock, 10);
        assert_eq!(product.batches[0].mrp, Money::from_paise(4800));
        assert_eq!(product.batches[0].purchase_price, Money::from_paise(3500));
        assert_eq!(product.batches[0].expiry_date, "2027-09".parse().unwrap());
        assert_eq!(outcome.purchase.items[0].batch_id.as_deref(), Some("b-1"));
    }

    #[test]
    fn test_same_batch_number_twice_makes_one_batch() {
        // Idempotent resolution: two lines, same number → one batch, 2× qty.
        let products = vec![product_with_batch("p-1", "b-1", "AZ1", 0)];
        let outcome = add_purchase(
            &products,
            &[],
            draft(
                "INV-2",
                vec![
                    existing_product_line("p-1", "AZ1", 5),
                    existing_product_line("p-1", "AZ1", 5),
                ],
            ),
        )
        .unwrap();

        let product = updated_product(&outcome, "p-1");
        assert_eq!(product.batches.len(), 1);
        assert_eq!(product.batches[0].stock, 10);
    }

    #[test]
    fn test_unknown_batch_number_appends_new_batch() {
        let products = vec![product_with_batch("p-1", "b-1", "AZ1", 4)];
        let outcome = add_purchase(
            &products,
            &[],
            draft("INV-3", vec![existing_product_line("p-1", "AZ2", 7)]),
        )
        .unwrap();

        let product = updated_product(&outcome, "p-1");
        assert_eq!(product.batches.len(), 2);
        assert_eq!(ledger::find_by_number(&product.batches, "AZ2").unwrap().stock, 7);
        // Batch numbers are case-sensitive: az1 would NOT have matched AZ1.
        assert_eq!(product.batches[0].stock, 4);
    }

    #[test]
    fn test_company_auto_creation_dedups_case_insensitively() {
        let known = vec![Company {
            id: "c-1".to_string(),
            name: "Cipla".to_string(),
            created_at: Utc::now(),
        }];
        let outcome = add_purchase(
            &[],
            &known,
            draft(
                "INV-4",
                vec![
                    new_product_line("A", "CIPLA", "B1", 1),
                    new_product_line("B", "Alembic", "B2", 1),
                    new_product_line("C", "alembic", "B3", 1),
                ],
            ),
        )
        .unwrap();

        let companies: Vec<Company> = outcome
            .write_set
            .ops()
            .iter()
            .filter(|op| op.collection() == Collection::Companies)
            .map(|op| match op {
                WriteOp::Create { body, .. } => serde_json::from_value(body.clone()).unwrap(),
                _ => panic!("companies are only created"),
            })
            .collect();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "Alembic");
    }

    #[test]
    fn test_synthetic_batch_ids_distinct_within_one_save() {
        let outcome = add_purchase(
            &[],
            &[],
            draft(
                "INV-5",
                vec![
                    new_product_line("A", "X", "B1", 1),
                    new_product_line("B", "X", "B2", 1),
                    new_product_line("C", "X", "B3", 1),
                ],
            ),
        )
        .unwrap();

        let mut ids: Vec<String> = outcome
            .purchase
            .items
            .iter()
            .map(|l| l.batch_id.clone().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_edit_reverts_against_live_state() {
        // Purchase brought batch Y from 0 → 4. Editing it to qty 6 must
        // leave 6, computed as revert(−4) then apply(+6) against the live
        // product, not by diffing the two purchase documents.
        let original = add_purchase(
            &[],
            &[],
            draft("INV-6", vec![new_product_line("A", "X", "Y1", 4)]),
        )
        .unwrap();
        let (product_id, _) = original.purchase.items[0].resolved_ids().unwrap();
        let live = vec![updated_product(&original, product_id)];
        assert_eq!(live[0].batches[0].stock, 4);

        let mut updated_line = original.purchase.items[0].clone();
        updated_line.quantity = 6;
        let outcome = edit_purchase(
            &live,
            &[],
            &original.purchase,
            draft("INV-6", vec![updated_line]),
        )
        .unwrap();

        let product = updated_product(&outcome, product_id);
        assert_eq!(product.batches.len(), 1);
        assert_eq!(product.batches[0].stock, 6);
        assert_eq!(outcome.purchase.id, original.purchase.id);
        assert_eq!(outcome.purchase.total_amount, Money::from_paise(19200));
    }

    #[test]
    fn test_edit_composes_when_stock_moved_since_save() {
        let original = add_purchase(
            &[],
            &[],
            draft("INV-7", vec![new_product_line("A", "X", "Y1", 4)]),
        )
        .unwrap();
        let (product_id, _) = original.purchase.items[0].resolved_ids().unwrap();

        // A sale consumed 3 units since the purchase was saved: live stock 1.
        let mut live_product = updated_product(&original, product_id);
        live_product.batches[0].stock = 1;

        let mut updated_line = original.purchase.items[0].clone();
        updated_line.quantity = 6;
        let outcome = edit_purchase(
            &[live_product],
            &[],
            &original.purchase,
            draft("INV-7", vec![updated_line]),
        )
        .unwrap();

        // revert(−4) → −3, apply(+6) → 3
        let product = updated_product(&outcome, product_id);
        assert_eq!(product.batches[0].stock, 3);
    }

    #[test]
    fn test_edit_clamps_negative_to_zero() {
        // Live stock already 0 (everything sold); removing the line's qty
        // reverts to −4, nothing re-applies to that batch → clamped to 0.
        let original = add_purchase(
            &[],
            &[],
            draft("INV-8", vec![new_product_line("A", "X", "Y1", 4)]),
        )
        .unwrap();
        let (product_id, _) = original.purchase.items[0].resolved_ids().unwrap();

        let mut live_product = updated_product(&original, product_id);
        live_product.batches[0].stock = 0;

        let replacement = existing_product_line(product_id, "Y2", 2);
        let outcome = edit_purchase(
            &[live_product],
            &[],
            &original.purchase,
            draft("INV-8", vec![replacement]),
        )
        .unwrap();

        let product = updated_product(&outcome, product_id);
        let original_batch = ledger::find_by_number(&product.batches, "Y1").unwrap();
        assert_eq!(original_batch.stock, 0);
        let new_batch = ledger::find_by_number(&product.batches, "Y2").unwrap();
        assert_eq!(new_batch.stock, 2);
    }

    #[test]
    fn test_edit_missing_product_warns_and_continues() {
        let original = add_purchase(
            &[],
            &[],
            draft("INV-9", vec![new_product_line("A", "X", "Y1", 4)]),
        )
        .unwrap();

        // Product has vanished entirely; the edit still succeeds.
        let replacement = new_product_line("B", "X", "Z1", 2);
        let outcome = edit_purchase(
            &[],
            &[],
            &original.purchase,
            draft("INV-9", vec![replacement]),
        )
        .unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            RevertWarning::MissingProduct { .. }
        ));
    }

    #[test]
    fn test_delete_subtracts_with_clamp() {
        let original = add_purchase(
            &[],
            &[],
            draft("INV-10", vec![new_product_line("A", "X", "Y1", 4)]),
        )
        .unwrap();
        let (product_id, _) = original.purchase.items[0].resolved_ids().unwrap();

        // 3 of the 4 purchased units were sold; live stock 1. Deleting the
        // purchase clamps 1 − 4 at zero.
        let mut live_product = updated_product(&original, product_id);
        live_product.batches[0].stock = 1;

        let outcome = delete_purchase(&[live_product], &original.purchase).unwrap();
        let product = updated_product(&outcome, product_id);
        assert_eq!(product.batches[0].stock, 0);
        assert!(matches!(
            outcome.write_set.ops()[0],
            WriteOp::Delete { .. }
        ));
    }

    #[test]
    fn test_delete_skips_unresolved_lines() {
        let mut line = new_product_line("A", "X", "Y1", 4);
        line.is_new_product = false; // never resolved
        let purchase = Purchase {
            id: "pur-1".to_string(),
            invoice_number: "INV-11".to_string(),
            supplier_name: "S".to_string(),
            items: vec![line],
            total_amount: Money::zero(),
            created_at: Utc::now(),
        };

        let outcome = delete_purchase(&[], &purchase).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.write_set.len(), 1);
    }
}
