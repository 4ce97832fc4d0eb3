//! # Batch Ledger
//!
//! Pure operations over a product's batch list. Every function returns a new
//! list; callers never observe in-place mutation.
//!
//! ## Policy Split
//! `apply_delta` itself allows a negative result — whether that is legal is
//! the transaction's decision, made with the two policy helpers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Transaction              Negative stock policy                         │
//! │  ───────────              ─────────────────────                        │
//! │  Bill edit                first_negative() → reject the whole edit      │
//! │  Purchase edit/delete     clamp_negative() → floor at zero, proceed     │
//! │  Bill generate            neither: the search UI gates overselling      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The asymmetry is deliberate and preserved from the system's observed
//! behavior; see DESIGN.md.

use crate::types::Batch;

/// Applies `delta` (positive or negative) to the stock of the batch with
/// `batch_id`, returning the new batch list.
///
/// Returns `None` when no batch carries that id; the caller decides whether
/// that is fatal (sales) or a skippable revert warning (purchase reverts).
/// The resulting stock may be negative — policy helpers below handle that.
pub fn apply_delta(batches: &[Batch], batch_id: &str, delta: i64) -> Option<Vec<Batch>> {
    batches.iter().any(|b| b.id == batch_id).then(|| {
        batches
            .iter()
            .map(|b| {
                if b.id == batch_id {
                    let mut b = b.clone();
                    b.stock += delta;
                    b
                } else {
                    b.clone()
                }
            })
            .collect()
    })
}

/// Exact, case-sensitive lookup by human batch number within one product.
///
/// Used by purchase processing to decide "increment existing batch" vs
/// "create new batch".
pub fn find_by_number<'a>(batches: &'a [Batch], batch_number: &str) -> Option<&'a Batch> {
    batches.iter().find(|b| b.batch_number == batch_number)
}

/// Appends `batch` if its id is unknown, replaces the existing entry if the
/// id is already present.
pub fn upsert_batch(batches: &[Batch], batch: Batch) -> Vec<Batch> {
    let mut next: Vec<Batch> = batches.to_vec();
    match next.iter_mut().find(|b| b.id == batch.id) {
        Some(slot) => *slot = batch,
        None => next.push(batch),
    }
    next
}

/// The first batch whose stock is below zero, if any. Reject path.
pub fn first_negative(batches: &[Batch]) -> Option<&Batch> {
    batches.iter().find(|b| b.stock < 0)
}

/// Floors every batch's stock at zero. Clamp path.
pub fn clamp_negative(batches: &[Batch]) -> Vec<Batch> {
    batches
        .iter()
        .map(|b| {
            let mut b = b.clone();
            b.stock = b.stock.max(0);
            b
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
