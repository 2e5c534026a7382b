//! In-memory document database for tests and embedding.

use super::{DocumentDatabase, RemoteDocument, WriteBatch};
use crate::error::RemoteError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use upsen_core::{CollectionPath, DocumentPath, FieldMap, RecordId};

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: FieldMap,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// In-memory [`DocumentDatabase`] backend.
///
/// Behaves like the hosted document store it stands in for: ids are
/// assigned on add, server time is stamped on every write, and fetches
/// return documents newest first. Two failure toggles exist for tests:
/// [`set_available`](MemoryDatabase::set_available) fails every call with
/// a transport error, [`set_read_only`](MemoryDatabase::set_read_only)
/// fails writes with a permission error while reads keep working.
///
/// Clones share all state.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    collections: Arc<DashMap<String, BTreeMap<RecordId, StoredDocument>>>,
    available: Arc<AtomicBool>,
    read_only: Arc<AtomicBool>,
    fetch_calls: Arc<AtomicUsize>,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    /// Create an empty, reachable database.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(true)),
            read_only: Arc::new(AtomicBool::new(false)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Toggle simulated connectivity.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Toggle write permission. Reads are unaffected.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of fetches issued so far, failed attempts included.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of documents stored under `path`.
    pub fn len(&self, path: &CollectionPath) -> usize {
        self.collections
            .get(&path.to_string())
            .map(|collection| collection.len())
            .unwrap_or(0)
    }

    /// Insert a document directly with a fixed creation time, bypassing
    /// the failure toggles. Test setup only.
    pub fn seed(
        &self,
        path: &CollectionPath,
        id: impl Into<RecordId>,
        fields: FieldMap,
        created_at_ms: i64,
    ) {
        let created_at =
            DateTime::from_timestamp_millis(created_at_ms).unwrap_or(DateTime::UNIX_EPOCH);
        self.collections
            .entry(path.to_string())
            .or_default()
            .insert(
                id.into(),
                StoredDocument {
                    fields,
                    created_at,
                    updated_at: created_at,
                },
            );
    }

    fn ensure_available(&self) -> Result<(), RemoteError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Transport("connection refused".to_string()))
        }
    }

    fn ensure_writable(&self) -> Result<(), RemoteError> {
        self.ensure_available()?;
        if self.read_only.load(Ordering::SeqCst) {
            Err(RemoteError::PermissionDenied(
                "write access denied".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl DocumentDatabase for MemoryDatabase {
    async fn fetch_all(&self, path: &CollectionPath) -> Result<Vec<RemoteDocument>, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let mut documents: Vec<RemoteDocument> = self
            .collections
            .get(&path.to_string())
            .map(|collection| {
                collection
                    .value()
                    .iter()
                    .map(|(id, stored)| RemoteDocument {
                        id: id.clone(),
                        fields: stored.fields.clone(),
                        created_at: Some(stored.created_at),
                        updated_at: Some(stored.updated_at),
                    })
                    .collect()
            })
            .unwrap_or_default();

        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn add(&self, path: &CollectionPath, fields: FieldMap) -> Result<RecordId, RemoteError> {
        self.ensure_writable()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        self.collections
            .entry(path.to_string())
            .or_default()
            .insert(
                id.clone(),
                StoredDocument {
                    fields,
                    created_at: now,
                    updated_at: now,
                },
            );
        Ok(id)
    }

    async fn update(&self, path: &DocumentPath, fields: FieldMap) -> Result<(), RemoteError> {
        self.ensure_writable()?;

        let mut collection = self
            .collections
            .get_mut(&path.collection.to_string())
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;
        let stored = collection
            .get_mut(&path.id)
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;

        for (name, value) in fields {
            stored.fields.insert(name, value);
        }
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), RemoteError> {
        self.ensure_writable()?;

        if let Some(mut collection) = self.collections.get_mut(&path.collection.to_string()) {
            collection.remove(&path.id);
        }
        Ok(())
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), RemoteError> {
        self.ensure_writable()?;

        let now = Utc::now();
        for (path, fields) in batch.writes() {
            self.collections
                .entry(path.collection.to_string())
                .or_default()
                .insert(
                    path.id.clone(),
                    StoredDocument {
                        fields: fields.clone(),
                        created_at: now,
                        updated_at: now,
                    },
                );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use upsen_core::{Collection, TenantId};

    fn amount(value: i64) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("amount".to_string(), json!(value));
        fields
    }

    fn path() -> CollectionPath {
        CollectionPath::current(TenantId::new("c-1"), Collection::Expenses)
    }

    #[tokio::test]
    async fn add_assigns_distinct_ids_and_stamps() {
        let db = MemoryDatabase::new();
        let a = db.add(&path(), amount(1)).await.unwrap();
        let b = db.add(&path(), amount(2)).await.unwrap();
        assert_ne!(a, b);

        let docs = db.fetch_all(&path()).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.created_at.is_some()));
    }

    #[tokio::test]
    async fn fetch_returns_newest_first() {
        let db = MemoryDatabase::new();
        db.seed(&path(), "old", amount(1), 1_000);
        db.seed(&path(), "new", amount(2), 9_000);
        db.seed(&path(), "mid", amount(3), 5_000);

        let ids: Vec<String> = db
            .fetch_all(&path())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn update_merges_and_missing_doc_fails() {
        let db = MemoryDatabase::new();
        db.seed(&path(), "e-1", amount(1), 1_000);

        db.update(&path().doc("e-1"), amount(42)).await.unwrap();
        let docs = db.fetch_all(&path()).await.unwrap();
        assert_eq!(docs[0].fields["amount"], json!(42));

        let err = db.update(&path().doc("ghost"), amount(1)).await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let db = MemoryDatabase::new();
        db.seed(&path(), "e-1", amount(1), 1_000);

        db.delete(&path().doc("e-1")).await.unwrap();
        db.delete(&path().doc("e-1")).await.unwrap();
        assert_eq!(db.len(&path()), 0);
    }

    #[tokio::test]
    async fn unavailable_database_fails_everything() {
        let db = MemoryDatabase::new();
        db.set_available(false);

        assert!(db.fetch_all(&path()).await.is_err());
        assert!(db.add(&path(), amount(1)).await.is_err());
        assert_eq!(db.fetch_calls(), 1); // failed fetch still counted
    }

    #[tokio::test]
    async fn read_only_database_fails_writes_only() {
        let db = MemoryDatabase::new();
        db.seed(&path(), "e-1", amount(1), 1_000);
        db.set_read_only(true);

        assert!(db.fetch_all(&path()).await.is_ok());
        let err = db.add(&path(), amount(2)).await.unwrap_err();
        assert!(matches!(err, RemoteError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn batch_commit_replaces_documents() {
        let db = MemoryDatabase::new();
        db.seed(&path(), "e-1", amount(1), 1_000);

        let mut batch = WriteBatch::new();
        batch.set(path().doc("e-1"), amount(100));
        batch.set(path().doc("e-2"), amount(200));
        db.commit_batch(batch).await.unwrap();

        let docs = db.fetch_all(&path()).await.unwrap();
        assert_eq!(docs.len(), 2);
        let replaced = docs.iter().find(|d| d.id == "e-1").unwrap();
        assert_eq!(replaced.fields["amount"], json!(100));
    }
}
