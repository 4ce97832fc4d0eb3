//! # Write-Sets
//!
//! The transaction engines never touch storage. Each operation computes an
//! ordered list of create/update/delete operations — a write-set — that the
//! entity store commits as a whole or rejects as a whole.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Write-Set Flow                                  │
//! │                                                                         │
//! │  Engine (pure)                    Store (I/O)                           │
//! │  ─────────────                    ───────────                          │
//! │  read snapshot ──► compute ──►  WriteSet ──► commit() ──► all applied   │
//! │                                     │                                   │
//! │                                     └────────────────► or none applied  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::EngineResult;

// =============================================================================
// Collections
// =============================================================================

/// The per-user document collections the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Bills,
    Purchases,
    Suppliers,
    Payments,
    Companies,
}

impl Collection {
    /// Stable collection name used as the storage key.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Bills => "bills",
            Collection::Purchases => "purchases",
            Collection::Suppliers => "suppliers",
            Collection::Payments => "payments",
            Collection::Companies => "companies",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Write Operations
// =============================================================================

/// One create/update/delete against a single document.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a new document; rejected if the id already exists.
    Create {
        collection: Collection,
        id: String,
        body: Value,
    },
    /// Replace an existing document; rejected if the id is missing.
    Update {
        collection: Collection,
        id: String,
        body: Value,
    },
    /// Remove an existing document; rejected if the id is missing.
    Delete { collection: Collection, id: String },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Create { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. } => *collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::Create { id, .. } | WriteOp::Update { id, .. } | WriteOp::Delete { id, .. } => {
                id
            }
        }
    }
}

// =============================================================================
// Write Set
// =============================================================================

/// An ordered collection of write operations with all-or-nothing semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSet {
    ops: Vec<WriteOp>,
}

impl WriteSet {
    pub fn new() -> Self {
        WriteSet::default()
    }

    /// Appends a create of `doc` serialized as the document body.
    pub fn create<T: Serialize>(
        &mut self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> EngineResult<()> {
        self.ops.push(WriteOp::Create {
            collection,
            id: id.to_string(),
            body: serde_json::to_value(doc)?,
        });
        Ok(())
    }

    /// Appends an update replacing the document body.
    pub fn update<T: Serialize>(
        &mut self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> EngineResult<()> {
        self.ops.push(WriteOp::Update {
            collection,
            id: id.to_string(),
            body: serde_json::to_value(doc)?,
        });
        Ok(())
    }

    /// Appends a delete.
    pub fn delete(&mut self, collection: Collection, id: &str) {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// The operations in commit order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_keep_insertion_order() {
        let mut ws = WriteSet::new();
        ws.create(Collection::Bills, "bill-1", &serde_json::json!({"n": 1}))
            .unwrap();
        ws.update(Collection::Products, "p-1", &serde_json::json!({"n": 2}))
            .unwrap();
        ws.delete(Collection::Bills, "bill-0");

        assert_eq!(ws.len(), 3);
        assert_eq!(ws.ops()[0].collection(), Collection::Bills);
        assert_eq!(ws.ops()[1].id(), "p-1");
        assert!(matches!(ws.ops()[2], WriteOp::Delete { .. }));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Products.as_str(), "products");
        assert_eq!(Collection::Companies.to_string(), "companies");
    }
}
