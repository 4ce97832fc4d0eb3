//! # aushadhi-store: Entity Store for Aushadhi POS
//!
//! Durable per-user collections of domain documents, consumed by the
//! transaction engines through two operations: snapshot reads and atomic
//! write-set commits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Aushadhi POS Data Flow                            │
//! │                                                                         │
//! │  aushadhi-service (generate_bill, add_purchase, …)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  aushadhi-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │  EntityStore   │   │  SqliteStore   │   │ MemoryStore  │  │   │
//! │  │   │  (trait)       │◄──│  documents     │   │ tests/demos  │  │   │
//! │  │   │  list/get/     │   │  table, WAL,   │   │ lock + swap  │  │   │
//! │  │   │  commit        │   │  transactions  │   │              │  │   │
//! │  │   └────────────────┘   └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Commit contract: a write-set applies in full or not at all. A          │
//! │  rejected write surfaces as StoreError::WriteRejected and leaves        │
//! │  every prior document untouched.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreConfig};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use aushadhi_core::writeset::{Collection, WriteSet};

/// One stored document: its id and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

impl Document {
    /// Decodes the body into a domain type.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| StoreError::Serialization(format!("document {}: {e}", self.id)))
    }
}

/// The entity store contract the engines are written against.
///
/// `list` returns a consistent snapshot of one collection; `commit` applies
/// an ordered write-set with all-or-nothing semantics. No partial commit is
/// ever observable.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Snapshot read of every document in a collection.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Fetches a single document, if present.
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Commits a write-set atomically. On error, nothing was applied.
    async fn commit(&self, write_set: WriteSet) -> StoreResult<()>;
}
