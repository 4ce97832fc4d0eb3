//! # Service Error Type
//!
//! Unified, serializable failure type for the UI boundary.
//!
//! Every operation returns either the committed record or one of these:
//! a machine-readable `code` for programmatic handling plus a
//! human-readable `message` for display.

use serde::Serialize;
use thiserror::Error;

use aushadhi_core::EngineError;
use aushadhi_store::StoreError;

/// Structured failure returned from service operations.
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced document not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// A stock change would drive a batch below zero
    InsufficientStock,

    /// The store declined the atomic commit; nothing was applied
    WriteRejected,

    /// Store/database failure
    StoreError,

    /// Internal error
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }
}

/// Converts engine errors to service errors.
impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::ProductNotFound(_) | EngineError::BatchNotFound { .. } => {
                ServiceError::new(ErrorCode::NotFound, err.to_string())
            }
            EngineError::NegativeStock { .. } => {
                ServiceError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            EngineError::Validation(e) => {
                ServiceError::new(ErrorCode::ValidationError, e.to_string())
            }
            EngineError::Serialization(_) => ServiceError::new(ErrorCode::Internal, err.to_string()),
        }
    }
}

/// Converts store errors to service errors.
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::WriteRejected { .. } => {
                ServiceError::new(ErrorCode::WriteRejected, err.to_string())
            }
            StoreError::NotFound { collection, id } => ServiceError::not_found(collection, id),
            StoreError::Serialization(_) => ServiceError::new(ErrorCode::Internal, err.to_string()),
            _ => {
                // Log the store detail; the caller gets a generic message.
                tracing::error!("store failure: {err}");
                ServiceError::new(ErrorCode::StoreError, "Store operation failed")
            }
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
