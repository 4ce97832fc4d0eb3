//! # Error Types
//!
//! Domain-specific error types for aushadhi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  aushadhi-core errors (this file)                                       │
//! │  ├── EngineError      - Transaction engine failures (fatal, pre-write)  │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── RevertWarning    - Non-fatal revert skips (values, not errors)     │
//! │                                                                         │
//! │  aushadhi-store errors (separate crate)                                 │
//! │  └── StoreError       - Commit rejections, connection failures          │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → ServiceError → Frontend          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, batch number, etc.)
//! 3. Errors are enum variants, never String
//! 4. Fatal kinds abort before any write reaches the store; warnings never
//!    block an operation

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Transaction engine errors.
///
/// Every variant is fatal: the engine returns it before emitting a write-set,
/// so a failed operation leaves no partial state behind.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced product is missing from the snapshot.
    ///
    /// ## When This Occurs
    /// - A bill edit references a product deleted since the bill was created
    /// - A purchase line carries a stale product id
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A referenced batch is missing from its owning product.
    #[error("Batch {batch_id} not found on product {product_id}")]
    BatchNotFound {
        product_id: String,
        batch_id: String,
    },

    /// A bill edit would drive a batch's stock below zero.
    ///
    /// ## When This Occurs
    /// - Editing a bill to sell more units than the batch currently holds
    ///   (after adding back what the original bill consumed)
    ///
    /// The whole edit is rejected; no product is written.
    #[error("Insufficient stock for batch {batch_number}: change would leave {resulting}")]
    NegativeStock {
        batch_number: String,
        resulting: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A document failed to serialize into a write-set payload.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller-supplied data doesn't meet requirements.
/// Used for early validation before engine logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid expiry date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate batch number on one product).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Revert Warnings
// =============================================================================

/// A revert step that could not be applied.
///
/// Deleting a bill or purchase (and the revert stage of a purchase edit)
/// adds or removes stock on batches recorded when the document was saved.
/// If the product or batch has since disappeared there is nothing to revert
/// onto: the step is skipped, the operation continues, and the skip is
/// reported as one of these values for the caller to log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevertWarning {
    /// The owning product no longer exists.
    #[error("product {product_id} missing, {quantity} units not reverted")]
    MissingProduct { product_id: String, quantity: i64 },

    /// The product exists but no longer carries the batch.
    #[error("batch {batch_id} missing on product {product_id}, {quantity} units not reverted")]
    MissingBatch {
        product_id: String,
        batch_id: String,
        quantity: i64,
    },

    /// A purchase line was never resolved to a product/batch identity.
    #[error("line for batch number '{batch_number}' has no resolved identity, skipped")]
    UnresolvedLine { batch_number: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::NegativeStock {
            batch_number: "AMX-2207".to_string(),
            resulting: -3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for batch AMX-2207: change would leave -3"
        );
    }

    #[test]
    fn test_validation_converts_to_engine_error() {
        let validation_err = ValidationError::Required {
            field: "invoiceNumber".to_string(),
        };
        let err: EngineError = validation_err.into();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_revert_warning_message() {
        let warning = RevertWarning::MissingProduct {
            product_id: "p-1".to_string(),
            quantity: 4,
        };
        assert_eq!(
            warning.to_string(),
            "product p-1 missing, 4 units not reverted"
        );
    }
}
