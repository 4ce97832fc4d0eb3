//! # Numbering / Identity Allocator
//!
//! Deterministic generation of business numbers and synthetic identifiers.
//!
//! ## Read-Fresh Rule
//! Bill and voucher numbers are derived, never stored as counters. The
//! caller must derive them from a snapshot read immediately before the
//! write — never from a cached in-memory list — so two sessions racing to
//! bill at the same moment see each other's committed numbers.

use chrono::Utc;
use uuid::Uuid;

use crate::types::{Bill, Payment};

/// Prefix for sequential bill numbers (`B0001`).
pub const BILL_NUMBER_PREFIX: &str = "B";

/// Prefix for sequential payment voucher numbers (`V0001`).
pub const VOUCHER_NUMBER_PREFIX: &str = "V";

/// The numeric value embedded in a bill number.
///
/// Strips every non-digit and parses the remainder, so `B0042` → 42 and a
/// hand-entered `42/A` → 42. Numbers with no digits count as 0.
pub fn numeric_suffix(number: &str) -> i64 {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Next bill number: max numeric suffix across all existing bills, plus one,
/// zero-padded to four digits.
///
/// Gaps left by deleted bills are never reused — the sequence only moves
/// forward from the current maximum.
///
/// ## Example
/// ```rust
/// use aushadhi_core::numbering::next_bill_number;
///
/// assert_eq!(next_bill_number(&[]), "B0001");
/// ```
pub fn next_bill_number(bills: &[Bill]) -> String {
    let max = bills
        .iter()
        .map(|b| numeric_suffix(&b.bill_number))
        .max()
        .unwrap_or(0);
    format!("{}{:04}", BILL_NUMBER_PREFIX, max + 1)
}

/// Next voucher number: one past the count of existing payments.
pub fn next_voucher_number(payments: &[Payment]) -> String {
    format!("{}{:04}", VOUCHER_NUMBER_PREFIX, payments.len() + 1)
}

/// Allocates a synthetic batch id: millisecond timestamp plus a random
/// token.
///
/// The random token keeps ids collision-free even when several new batches
/// are allocated inside the same purchase-save (same millisecond). Batch
/// ids are opaque and never shown to users — `batchNumber` is the
/// human-facing label.
pub fn new_batch_id() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("BT-{}-{}", Utc::now().timestamp_millis(), &token[..8])
}

/// Allocates a new document id (UUID v4).
pub fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Utc;
    use std::collections::HashSet;

    fn bill(number: &str) -> Bill {
        Bill {
            id: new_document_id(),
            bill_number: number.to_string(),
            customer_name: String::new(),
            items: vec![],
            sub_total: Money::zero(),
            total_gst: Money::zero(),
            grand_total: Money::zero(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("B0042"), 42);
        assert_eq!(numeric_suffix("B-17/A"), 17);
        assert_eq!(numeric_suffix("draft"), 0);
    }

    #[test]
    fn test_first_bill_number() {
        assert_eq!(next_bill_number(&[]), "B0001");
    }

    #[test]
    fn test_bill_number_skips_deletion_gaps() {
        // B0002 was deleted; the max is what matters.
        let bills = vec![bill("B0001"), bill("B0003")];
        assert_eq!(next_bill_number(&bills), "B0004");
    }

    #[test]
    fn test_bill_number_ignores_format_noise() {
        let bills = vec![bill("B0009"), bill("12"), bill("junk")];
        assert_eq!(next_bill_number(&bills), "B0013");
    }

    #[test]
    fn test_voucher_number_from_count() {
        assert_eq!(next_voucher_number(&[]), "V0001");
    }

    #[test]
    fn test_batch_ids_unique_in_tight_loop() {
        // Many allocations within the same millisecond must not collide.
        let ids: HashSet<String> = (0..200).map(|_| new_batch_id()).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.starts_with("BT-")));
    }
}
