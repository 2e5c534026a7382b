//! JSON-file-backed key-value store.
//!
//! The whole map is loaded once at open and written back on every
//! mutation, which matches the access pattern of the layer above: small
//! blobs, rewritten wholesale. Writes go through a temp file and a rename
//! so a crash mid-write never leaves a torn store behind.

use super::KeyValueStore;
use crate::error::StoreError;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Durable [`KeyValueStore`] persisted as one JSON object on disk.
///
/// Clones share the in-memory map and the backing file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: Arc<PathBuf>,
    entries: Arc<DashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file does
    /// not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let map: BTreeMap<String, String> =
                serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            for (key, value) in map {
                entries.insert(key, value);
            }
        }

        Ok(Self {
            path: Arc::new(path),
            entries: Arc::new(entries),
        })
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        // Sorted keys, deterministic file content
        let map: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let raw = match serde_json::to_string_pretty(&map) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize store file: {}", e);
                return;
            }
        };

        let tmp = self.path.with_extension("tmp");
        let result = fs::write(&tmp, raw).and_then(|_| fs::rename(&tmp, self.path.as_ref()));
        if let Err(e) = result {
            tracing::warn!("Failed to persist store file {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.persist();
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
        self.persist();
    }
}
