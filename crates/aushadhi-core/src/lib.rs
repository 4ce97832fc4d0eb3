//! # aushadhi-core: Pure Business Logic for Aushadhi POS
//!
//! This crate is the **heart** of Aushadhi POS. It contains the stock
//! reconciliation engine — the logic that keeps per-batch stock consistent
//! as bills and purchases are created, edited, and deleted — as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Aushadhi POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       Frontend (UI)                             │   │
//! │  │    Billing ──► Purchases ──► Suppliers ──► Reports              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     aushadhi-service                            │   │
//! │  │    generate_bill, update_bill, add_purchase, …                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ aushadhi-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │   sale    │  │ purchase  │  │ numbering │  │   │
//! │  │   │ apply_Δ   │  │ generate  │  │ resolve   │  │ B0001 …   │  │   │
//! │  │   │ find/upsrt│  │ edit/del  │  │ revert/   │  │ batch ids │  │   │
//! │  │   │           │  │           │  │ reapply   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │  write-sets                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     aushadhi-store                              │   │
//! │  │        all-or-nothing commit of each emitted write-set          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain documents (Product, Batch, Bill, Purchase, …)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`expiry`] - Year-month batch expiry dates
//! - [`ledger`] - Pure batch-list operations
//! - [`sale`] - Sale transaction engine
//! - [`purchase`] - Purchase transaction engine
//! - [`catalog`] - Manual product/batch entry
//! - [`numbering`] - Bill/voucher numbers and synthetic ids
//! - [`balances`] - Supplier outstanding balances
//! - [`writeset`] - The atomic mutation description engines emit
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Engines**: every operation reads a snapshot and returns a
//!    write-set; nothing here performs a write
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are paise (i64) so the bill
//!    invariant `subTotal + totalGst == grandTotal` holds exactly
//! 4. **Explicit Errors**: fatal kinds are typed and returned before any
//!    write; non-fatal revert skips are warning values, never panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balances;
pub mod catalog;
pub mod error;
pub mod expiry;
pub mod ledger;
pub mod money;
pub mod numbering;
pub mod purchase;
pub mod sale;
pub mod types;
pub mod validation;
pub mod writeset;

mod working;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use aushadhi_core::Money` instead of
// `use aushadhi_core::money::Money`

pub use error::{EngineError, EngineResult, RevertWarning, ValidationError};
pub use expiry::ExpiryDate;
pub use money::Money;
pub use types::*;
pub use writeset::{Collection, WriteOp, WriteSet};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single bill
///
/// Keeps runaway carts out of the store; a retail pharmacy bill never
/// legitimately reaches this.
pub const MAX_BILL_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;
