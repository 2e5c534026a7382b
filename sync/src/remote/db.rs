//! The remote document-database surface.

use crate::error::RemoteError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use upsen_core::{CollectionPath, DocumentPath, FieldMap, RecordId};

/// Field stamped with the owning tenant on every remote write.
pub const USER_ID_FIELD: &str = "userId";

/// A document as the remote store returns it.
///
/// Server-side timestamps arrive typed; the adapter folds them into the
/// canonical textual form before anything leaves the remote module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    /// Identifier, equal to the last path segment.
    pub id: RecordId,
    /// Stored fields.
    pub fields: FieldMap,
    /// Server-stamped creation time, when the document has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Server-stamped update time, when the document has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An ordered set of document writes committed as one unit.
///
/// Only set-writes exist; that is all migration needs.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<(DocumentPath, FieldMap)>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a set-write of `fields` at `path`, replacing any existing
    /// document there.
    pub fn set(&mut self, path: DocumentPath, fields: FieldMap) -> &mut Self {
        self.writes.push((path, fields));
        self
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether the batch holds no writes.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// The queued writes, in insertion order.
    pub fn writes(&self) -> &[(DocumentPath, FieldMap)] {
        &self.writes
    }
}

/// Interface to the remote document database.
///
/// Implementations assign ids on [`add`](DocumentDatabase::add), stamp
/// server time on every write, and report every failure as a
/// [`RemoteError`] kind. A raw backend error must never cross this
/// boundary.
#[allow(async_fn_in_trait)]
pub trait DocumentDatabase: Send + Sync {
    /// Fetch every document under `path`, in backend order.
    async fn fetch_all(&self, path: &CollectionPath) -> Result<Vec<RemoteDocument>, RemoteError>;

    /// Create a document with a server-assigned id, returning that id.
    async fn add(&self, path: &CollectionPath, fields: FieldMap) -> Result<RecordId, RemoteError>;

    /// Merge `fields` into the document at `path`, stamping update time.
    ///
    /// Fails with [`RemoteError::NotFound`] when the document is absent.
    async fn update(&self, path: &DocumentPath, fields: FieldMap) -> Result<(), RemoteError>;

    /// Delete the document at `path`. Deleting an absent document
    /// succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), RemoteError>;

    /// Commit every write in `batch`. All writes land or none do.
    async fn commit_batch(&self, batch: WriteBatch) -> Result<(), RemoteError>;
}
