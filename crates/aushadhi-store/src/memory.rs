//! # In-Memory Store
//!
//! A process-local [`EntityStore`] used by tests, demos, and anything that
//! needs engine semantics without a database file.
//!
//! ## Atomicity
//! `commit` holds the single write lock, applies the whole set to a working
//! copy, and swaps it in only if every operation validated. A rejected set
//! therefore leaves the published state untouched — the same contract the
//! SQLite store gets from its transaction.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use aushadhi_core::writeset::{Collection, WriteOp, WriteSet};

use crate::error::{StoreError, StoreResult};
use crate::{Document, EntityStore};

type Collections = HashMap<Collection, BTreeMap<String, Value>>;

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of documents currently in a collection (diagnostics).
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

fn apply(data: &mut Collections, op: &WriteOp) -> StoreResult<()> {
    match op {
        WriteOp::Create { collection, id, body } => {
            let docs = data.entry(*collection).or_default();
            if docs.contains_key(id) {
                return Err(StoreError::rejected(format!(
                    "create over existing document {collection}/{id}"
                )));
            }
            docs.insert(id.clone(), body.clone());
        }
        WriteOp::Update { collection, id, body } => {
            let docs = data.entry(*collection).or_default();
            match docs.get_mut(id) {
                Some(slot) => *slot = body.clone(),
                None => {
                    return Err(StoreError::rejected(format!(
                        "update of missing document {collection}/{id}"
                    )))
                }
            }
        }
        WriteOp::Delete { collection, id } => {
            let docs = data.entry(*collection).or_default();
            if docs.remove(id).is_none() {
                return Err(StoreError::rejected(format!(
                    "delete of missing document {collection}/{id}"
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let data = self.collections.read().await;
        Ok(data
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| Document {
                        id: id.clone(),
                        body: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let data = self.collections.read().await;
        Ok(data.get(&collection).and_then(|docs| {
            docs.get(id).map(|body| Document {
                id: id.to_string(),
                body: body.clone(),
            })
        }))
    }

    async fn commit(&self, write_set: WriteSet) -> StoreResult<()> {
        let mut data = self.collections.write().await;
        debug!(ops = write_set.len(), "Committing write set (memory)");

        // Validate and apply on a working copy; publish only on full success.
        let mut next = data.clone();
        for op in write_set.ops() {
            apply(&mut next, op)?;
        }
        *data = next;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_list_and_get() {
        let store = MemoryStore::new();

        let mut ws = WriteSet::new();
        ws.create(Collection::Products, "p-1", &json!({"name": "Dolo 650"}))
            .unwrap();
        store.commit(ws).await.unwrap();

        let listed = store.list(Collection::Products).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "p-1");

        let fetched = store.get(Collection::Products, "p-1").await.unwrap();
        assert!(fetched.is_some());
        assert!(store
            .get(Collection::Products, "p-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rejected_set_applies_nothing() {
        let store = MemoryStore::new();

        let mut seed = WriteSet::new();
        seed.create(Collection::Products, "p-1", &json!({"v": 1}))
            .unwrap();
        store.commit(seed).await.unwrap();

        // Second op collides; the first op must not stick either.
        let mut ws = WriteSet::new();
        ws.create(Collection::Products, "p-2", &json!({"v": 2}))
            .unwrap();
        ws.create(Collection::Products, "p-1", &json!({"v": 3}))
            .unwrap();

        let err = store.commit(ws).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteRejected { .. }));

        assert_eq!(store.count(Collection::Products).await, 1);
        let doc = store
            .get(Collection::Products, "p-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.body, json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_existence() {
        let store = MemoryStore::new();

        let mut update = WriteSet::new();
        update
            .update(Collection::Bills, "missing", &json!({}))
            .unwrap();
        assert!(store.commit(update).await.is_err());

        let mut delete = WriteSet::new();
        delete.delete(Collection::Bills, "missing");
        assert!(store.commit(delete).await.is_err());
    }
}
