//! # Sale Transaction Engine
//!
//! Builds the write-sets for bill generation, edit, and deletion, keeping
//! per-batch stock consistent with what each bill sells.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bill Lifecycle                                   │
//! │                                                                         │
//! │   {Draft cart} ──[generate]──► {Committed} ──[delete]──► {Deleted}      │
//! │                                   │    ▲                                │
//! │                                   └────┘                                │
//! │                                   [edit]                                │
//! │                                                                         │
//! │   No other transitions: a deleted bill is gone from the store and       │
//! │   cannot be re-opened or re-edited.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Rules
//! - **generate** decrements each cart line's batch. It does NOT re-check
//!   stock: the search step that builds the cart is expected to forbid
//!   selling more than available. Known gap, kept as observed.
//! - **edit** nets old-vs-new quantities per batch and rejects the whole
//!   edit if any touched batch would land below zero.
//! - **delete** is strictly additive (stock flows back), so it cannot go
//!   negative; a vanished product just means there is nothing to revert
//!   onto, which is reported as a warning, not a failure.

use chrono::Utc;

use crate::error::{EngineError, EngineResult, RevertWarning};
use crate::money::Money;
use crate::numbering;
use crate::types::{Bill, CartItem, Product};
use crate::validation;
use crate::working::{DeltaOutcome, ProductSet};
use crate::writeset::{Collection, WriteSet};

use std::collections::BTreeMap;

// =============================================================================
// Outcome
// =============================================================================

/// The result of a sale-engine operation: the bill as it should exist after
/// the commit, the atomic write-set realizing it, and any non-fatal revert
/// warnings gathered along the way.
#[derive(Debug)]
pub struct SaleOutcome {
    pub bill: Bill,
    pub write_set: WriteSet,
    pub warnings: Vec<RevertWarning>,
}

// =============================================================================
// Totals
// =============================================================================

/// Recomputes line totals and bill totals from the cart.
///
/// Per-line GST is the exact complement of the GST-exclusive base, so the
/// bill invariant `sub_total + total_gst == grand_total` holds exactly.
fn compute_totals(items: &mut [CartItem]) -> (Money, Money, Money) {
    let mut sub_total = Money::zero();
    let mut total_gst = Money::zero();
    let mut grand_total = Money::zero();

    for item in items.iter_mut() {
        item.total = item.line_total();
        let base = item.base_amount();
        sub_total += base;
        total_gst += item.total - base;
        grand_total += item.total;
    }

    (sub_total, total_gst, grand_total)
}

// =============================================================================
// Generate
// =============================================================================

/// Creates a bill from a cart, decrementing each line's batch stock.
///
/// The bill number derives from the bills snapshot (max numeric suffix + 1),
/// which the caller must have read fresh from the store — see
/// [`crate::numbering`].
///
/// Emits `{create Bill, update N Products}` as one atomic write-set.
pub fn generate_bill(
    products: &[Product],
    bills: &[Bill],
    mut items: Vec<CartItem>,
    customer_name: &str,
) -> EngineResult<SaleOutcome> {
    validation::validate_cart(&items)?;

    let now = Utc::now();
    let mut set = ProductSet::new(products);

    for item in &items {
        match set.apply_delta(&item.product_id, &item.batch_id, -item.quantity, now) {
            DeltaOutcome::Applied => {}
            DeltaOutcome::MissingProduct => {
                return Err(EngineError::ProductNotFound(item.product_id.clone()))
            }
            DeltaOutcome::MissingBatch => {
                return Err(EngineError::BatchNotFound {
                    product_id: item.product_id.clone(),
                    batch_id: item.batch_id.clone(),
                })
            }
        }
    }

    let (sub_total, total_gst, grand_total) = compute_totals(&mut items);

    let bill = Bill {
        id: numbering::new_document_id(),
        bill_number: numbering::next_bill_number(bills),
        customer_name: customer_name.trim().to_string(),
        items,
        sub_total,
        total_gst,
        grand_total,
        created_at: now,
    };

    let mut write_set = WriteSet::new();
    write_set.create(Collection::Bills, &bill.id, &bill)?;
    set.push_ops(&mut write_set)?;

    Ok(SaleOutcome {
        bill,
        write_set,
        warnings: Vec::new(),
    })
}

// =============================================================================
// Edit
// =============================================================================

/// Edits a committed bill, reconciling stock by netting.
///
/// For every batch appearing in either item list the net delta is
/// `Σ originalQty − Σ updatedQty`: add back what the original consumed,
/// subtract what the new version consumes. Batches that net to zero are
/// untouched. A missing product or batch is a hard stop, and if any touched
/// batch would go negative the whole edit is rejected before a single write.
///
/// Emits `{update Bill, update M Products}`.
pub fn edit_bill(products: &[Product], original: &Bill, updated: &Bill) -> EngineResult<SaleOutcome> {
    validation::validate_cart(&updated.items)?;

    let now = Utc::now();

    // Netting: batch id → (owning product, signed delta).
    let mut net: BTreeMap<&str, (&str, i64)> = BTreeMap::new();
    for item in &original.items {
        let entry = net
            .entry(item.batch_id.as_str())
            .or_insert((item.product_id.as_str(), 0));
        entry.1 += item.quantity;
    }
    for item in &updated.items {
        let entry = net
            .entry(item.batch_id.as_str())
            .or_insert((item.product_id.as_str(), 0));
        entry.1 -= item.quantity;
    }

    let mut set = ProductSet::new(products);

    for (batch_id, (product_id, delta)) in &net {
        if *delta == 0 {
            continue;
        }
        match set.apply_delta(product_id, batch_id, *delta, now) {
            DeltaOutcome::Applied => {}
            DeltaOutcome::MissingProduct => {
                return Err(EngineError::ProductNotFound(product_id.to_string()))
            }
            DeltaOutcome::MissingBatch => {
                return Err(EngineError::BatchNotFound {
                    product_id: product_id.to_string(),
                    batch_id: batch_id.to_string(),
                })
            }
        }
    }

    // Stock-safety gate: reject the whole edit before any write.
    for product in set.touched() {
        if let Some(batch) = crate::ledger::first_negative(&product.batches) {
            return Err(EngineError::NegativeStock {
                batch_number: batch.batch_number.clone(),
                resulting: batch.stock,
            });
        }
    }

    let mut bill = updated.clone();
    bill.id = original.id.clone();
    bill.bill_number = original.bill_number.clone();
    bill.created_at = original.created_at;
    let (sub_total, total_gst, grand_total) = compute_totals(&mut bill.items);
    bill.sub_total = sub_total;
    bill.total_gst = total_gst;
    bill.grand_total = grand_total;

    let mut write_set = WriteSet::new();
    write_set.update(Collection::Bills, &bill.id, &bill)?;
    set.push_ops(&mut write_set)?;

    Ok(SaleOutcome {
        bill,
        write_set,
        warnings: Vec::new(),
    })
}

// =============================================================================
// Delete
// =============================================================================

/// Deletes a bill, reverting every item's quantity back onto its batch.
///
/// Strictly additive, so no negative-stock check applies. Items whose
/// product or batch no longer exists are skipped with a warning — the
/// missing product means there is nothing to revert onto — and the deletion
/// still proceeds.
///
/// Emits `{delete Bill, update N Products}`.
pub fn delete_bill(products: &[Product], bill: &Bill) -> EngineResult<SaleOutcome> {
    let now = Utc::now();
    let mut set = ProductSet::new(products);
    let mut warnings = Vec::new();

    for item in &bill.items {
        match set.apply_delta(&item.product_id, &item.batch_id, item.quantity, now) {
            DeltaOutcome::Applied => {}
            DeltaOutcome::MissingProduct => warnings.push(RevertWarning::MissingProduct {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            }),
            DeltaOutcome::MissingBatch => warnings.push(RevertWarning::MissingBatch {
                product_id: item.product_id.clone(),
                batch_id: item.batch_id.clone(),
                quantity: item.quantity,
            }),
        }
    }

    let mut write_set = WriteSet::new();
    write_set.delete(Collection::Bills, &bill.id);
    set.push_ops(&mut write_set)?;

    Ok(SaleOutcome {
        bill: bill.clone(),
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
    use crate::types::{Batch, GstRate};
    use crate::writeset::WriteOp;

    fn product(id: &str, batches: Vec<(&str, &str, i64)>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            company: "Cipla".to_string(),
            hsn_code: "3004".to_string(),
            gst: GstRate::from_percentage(12.0),
            composition: None,
            batches: batches
                .into_iter()
                .map(|(bid, number, stock)| Batch {
                    id: bid.to_string(),
                    batch_number: number.to_string(),
                    expiry_date: "2027-06".parse().unwrap(),
                    stock,
                    mrp: Money::from_paise(2500),
                    purchase_price: Money::from_paise(1800),
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_item(product_id: &str, batch_id: &str, quantity: i64) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            batch_id: batch_id.to_string(),
            product_name: "Product".to_string(),
            batch_number: "N-1".to_string(),
            quantity,
            mrp: Money::from_paise(2500),
            gst: GstRate::from_percentage(12.0),
            total: Money::zero(),
        }
    }

    fn stock_in(write_set: &WriteSet, product_id: &str, batch_id: &str) -> i64 {
        for op in write_set.ops() {
            if let WriteOp::Update { collection, id, body } = op {
                if *collection == Collection::Products && id == product_id {
                    let product: Product = serde_json::from_value(body.clone()).unwrap();
                    return product.batch(batch_id).unwrap().stock;
                }
            }
        }
        panic!("no product update for {product_id} in write set");
    }

    #[test]
    fn test_generate_decrements_stock_and_numbers_bill() {
        let products = vec![product("p-1", vec![("b-1", "X1", 10)])];
        let outcome =
            generate_bill(&products, &[], vec![cart_item("p-1", "b-1", 4)], "Asha").unwrap();

        assert_eq!(outcome.bill.bill_number, "B0001");
        assert_eq!(outcome.write_set.len(), 2);
        assert_eq!(stock_in(&outcome.write_set, "p-1", "b-1"), 6);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_generate_bill_arithmetic_invariant() {
        let products = vec![product("p-1", vec![("b-1", "X1", 100)])];
        let mut item = cart_item("p-1", "b-1", 3);
        item.mrp = Money::from_paise(3333);
        item.gst = GstRate::from_percentage(18.0);

        let bill = generate_bill(&products, &[], vec![item], "")
            .unwrap()
            .bill;
        assert_eq!(bill.grand_total, bill.sub_total + bill.total_gst);
        assert_eq!(bill.grand_total, Money::from_paise(9999));
    }

    #[test]
    fn test_generate_unknown_product_is_fatal() {
        let err = generate_bill(&[], &[], vec![cart_item("p-x", "b-1", 1)], "").unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound(_)));
    }

    #[test]
    fn test_generate_does_not_floor_check() {
        // Documented gap: the engine trusts the cart search step.
        let products = vec![product("p-1", vec![("b-1", "X1", 2)])];
        let outcome =
            generate_bill(&products, &[], vec![cart_item("p-1", "b-1", 5)], "").unwrap();
        assert_eq!(stock_in(&outcome.write_set, "p-1", "b-1"), -3);
    }

    #[test]
    fn test_generate_then_delete_restores_stock() {
        let products = vec![product("p-1", vec![("b-1", "X1", 10)])];
        let generated =
            generate_bill(&products, &[], vec![cart_item("p-1", "b-1", 4)], "").unwrap();

        // Products as they stand after the generate commit.
        let after: Vec<Product> = vec![
            serde_json::from_value(match &generated.write_set.ops()[1] {
                WriteOp::Update { body, .. } => body.clone(),
                _ => panic!("expected product update"),
            })
            .unwrap(),
        ];

        let deleted = delete_bill(&after, &generated.bill).unwrap();
        assert_eq!(stock_in(&deleted.write_set, "p-1", "b-1"), 10);
    }

    #[test]
    fn test_edit_reconciles_against_original_not_current() {
        // Bill sold 5 of batch X (stock 10 → 5); editing to 3 must leave 7.
        let products_now = vec![product("p-1", vec![("b-1", "X1", 5)])];
        let original_products = vec![product("p-1", vec![("b-1", "X1", 10)])];

        let original = generate_bill(
            &original_products,
            &[],
            vec![cart_item("p-1", "b-1", 5)],
            "",
        )
        .unwrap()
        .bill;

        let mut updated = original.clone();
        updated.items[0].quantity = 3;

        let outcome = edit_bill(&products_now, &original, &updated).unwrap();
        assert_eq!(stock_in(&outcome.write_set, "p-1", "b-1"), 7);
    }

    #[test]
    fn test_edit_skips_batches_with_zero_net_delta() {
        let products = vec![product(
            "p-1",
            vec![("b-1", "X1", 5), ("b-2", "X2", 8)],
        )];

        let original = Bill {
            id: "bill-1".to_string(),
            bill_number: "B0001".to_string(),
            customer_name: String::new(),
            items: vec![cart_item("p-1", "b-1", 5), cart_item("p-1", "b-2", 2)],
            sub_total: Money::zero(),
            total_gst: Money::zero(),
            grand_total: Money::zero(),
            created_at: Utc::now(),
        };
        let mut updated = original.clone();
        updated.items[1].quantity = 4; // b-1 unchanged, b-2 sells 2 more

        let outcome = edit_bill(&products, &original, &updated).unwrap();
        // Only the bill update and one product update.
        assert_eq!(outcome.write_set.len(), 2);
        assert_eq!(stock_in(&outcome.write_set, "p-1", "b-2"), 6);
    }

    #[test]
    fn test_edit_rejects_negative_stock_whole() {
        // Stock 5 now; original sold 5; editing to 12 would leave 10 − 12 < 0.
        let products = vec![product("p-1", vec![("b-1", "X1", 5)])];

        let original = Bill {
            id: "bill-1".to_string(),
            bill_number: "B0001".to_string(),
            customer_name: String::new(),
            items: vec![cart_item("p-1", "b-1", 5)],
            sub_total: Money::zero(),
            total_gst: Money::zero(),
            grand_total: Money::zero(),
            created_at: Utc::now(),
        };
        let mut updated = original.clone();
        updated.items[0].quantity = 12;

        let err = edit_bill(&products, &original, &updated).unwrap_err();
        assert!(matches!(err, EngineError::NegativeStock { resulting: -2, .. }));
    }

    #[test]
    fn test_edit_missing_product_is_fatal() {
        let original = Bill {
            id: "bill-1".to_string(),
            bill_number: "B0001".to_string(),
            customer_name: String::new(),
            items: vec![cart_item("p-gone", "b-1", 2)],
            sub_total: Money::zero(),
            total_gst: Money::zero(),
            grand_total: Money::zero(),
            created_at: Utc::now(),
        };
        let mut updated = original.clone();
        updated.items[0].quantity = 1;

        let err = edit_bill(&[], &original, &updated).unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound(_)));
    }

    #[test]
    fn test_edit_preserves_identity() {
        let products = vec![product("p-1", vec![("b-1", "X1", 10)])];
        let original = generate_bill(&products, &[], vec![cart_item("p-1", "b-1", 2)], "A")
            .unwrap()
            .bill;

        let mut updated = original.clone();
        updated.id = "spoofed".to_string();
        updated.bill_number = "B9999".to_string();
        updated.items[0].quantity = 1;

        let products_now = vec![product("p-1", vec![("b-1", "X1", 8)])];
        let outcome = edit_bill(&products_now, &original, &updated).unwrap();
        assert_eq!(outcome.bill.id, original.id);
        assert_eq!(outcome.bill.bill_number, original.bill_number);
    }

    #[test]
    fn test_delete_missing_product_warns_but_proceeds() {
        let bill = Bill {
            id: "bill-1".to_string(),
            bill_number: "B0001".to_string(),
            customer_name: String::new(),
            items: vec![cart_item("p-gone", "b-1", 2)],
            sub_total: Money::zero(),
            total_gst: Money::zero(),
            grand_total: Money::zero(),
            created_at: Utc::now(),
        };

        let outcome = delete_bill(&[], &bill).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        // The bill delete still goes through, with no product updates.
        assert_eq!(outcome.write_set.len(), 1);
        assert!(matches!(outcome.write_set.ops()[0], WriteOp::Delete { .. }));
    }
}
