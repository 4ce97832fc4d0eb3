//! # Supplier Balances
//!
//! Suppliers are linked to purchases and payments by name, not by id —
//! matching is case-insensitive on the trimmed name. Outstanding balance is
//! a read-side aggregate: purchases owed minus payments made.

use crate::money::Money;
use crate::types::{Payment, Purchase};

/// Case-insensitive, whitespace-trimmed name equality.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Outstanding balance for one supplier:
/// Σ totalAmount of matching purchases − Σ amount of matching payments.
///
/// Positive means the pharmacy still owes the supplier; negative means an
/// overpayment/advance.
pub fn supplier_outstanding(name: &str, purchases: &[Purchase], payments: &[Payment]) -> Money {
    let owed = purchases
        .iter()
        .filter(|p| names_match(&p.supplier_name, name))
        .fold(Money::zero(), |acc, p| acc + p.total_amount);

    let paid = payments
        .iter()
        .filter(|p| names_match(&p.supplier_name, name))
        .fold(Money::zero(), |acc, p| acc + p.amount);

    owed - paid
}

// =============================================================================
// Unit Tests
// =============================================================================
