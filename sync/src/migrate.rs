//! One-shot migration utilities.
//!
//! Two movements, both copies rather than moves: documents from the
//! legacy remote layout into the current one, and local-only records up
//! into the remote store. Source data is never deleted. Collections are
//! handled in isolation, so one failing collection neither stops nor
//! rolls back the others, and a re-run picks up whatever is still
//! missing.

use crate::clock;
use crate::error::RemoteError;
use crate::local;
use crate::remote::{DocumentDatabase, WriteBatch, USER_ID_FIELD};
use crate::store::KeyValueStore;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use upsen_core::{Collection, CollectionPath, FieldMap, Record, TenantId, CREATED_AT_FIELD};

/// Field holding the creation time a document had before it was copied.
pub const ORIGINAL_CREATED_AT_FIELD: &str = "originalCreatedAt";

/// Field stamping when a document was copied.
pub const MIGRATED_AT_FIELD: &str = "migratedAt";

/// Per-collection outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMigration {
    /// The collection this outcome describes.
    pub collection: Collection,
    /// Documents copied by this run.
    pub migrated: usize,
    /// Documents found at the source.
    pub total: usize,
    /// Why the collection failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionMigration {
    fn completed(collection: Collection, migrated: usize, total: usize) -> Self {
        Self {
            collection,
            migrated,
            total,
            error: None,
        }
    }

    fn failed(collection: Collection, total: usize, error: String) -> Self {
        Self {
            collection,
            migrated: 0,
            total,
            error: Some(error),
        }
    }
}

/// Outcome of a migration run, one entry per collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Outcomes in [`Collection::ALL`] order.
    pub collections: Vec<CollectionMigration>,
}

impl MigrationReport {
    /// Total documents copied across all collections.
    pub fn migrated(&self) -> usize {
        self.collections.iter().map(|c| c.migrated).sum()
    }

    /// Whether every collection completed without error.
    pub fn is_complete(&self) -> bool {
        self.collections.iter().all(|c| c.error.is_none())
    }
}

/// Migration need of one collection, as reported by [`check_migration`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    /// The inspected collection.
    pub collection: Collection,
    /// Documents at the legacy path.
    pub legacy_count: usize,
    /// Documents at the current path.
    pub current_count: usize,
    /// True when the legacy path has documents and the current one has
    /// none.
    pub needs_migration: bool,
}

/// Copy every legacy-layout document the current layout does not already
/// hold.
///
/// Copied documents keep their fields. The original creation time moves
/// into `originalCreatedAt`, and `migratedAt` plus the owning `userId`
/// are stamped on. Each collection is committed as one batch, so a
/// collection either migrates fully or not at all.
pub async fn migrate_legacy<D: DocumentDatabase>(db: &D, tenant: &TenantId) -> MigrationReport {
    let mut collections = Vec::with_capacity(Collection::ALL.len());
    for collection in Collection::ALL {
        collections.push(migrate_collection(db, tenant, collection).await);
    }
    MigrationReport { collections }
}

async fn migrate_collection<D: DocumentDatabase>(
    db: &D,
    tenant: &TenantId,
    collection: Collection,
) -> CollectionMigration {
    let legacy_path = CollectionPath::legacy(tenant.clone(), collection);
    let current_path = CollectionPath::current(tenant.clone(), collection);

    let legacy = match db.fetch_all(&legacy_path).await {
        Ok(documents) => documents,
        Err(e) => {
            tracing::warn!("Migration could not read {}: {}", legacy_path, e);
            return CollectionMigration::failed(collection, 0, e.to_string());
        }
    };
    let total = legacy.len();

    let existing = match existing_ids(db, &current_path).await {
        Ok(ids) => ids,
        Err(e) => return CollectionMigration::failed(collection, total, e.to_string()),
    };

    let migrated_at = clock::now();
    let mut batch = WriteBatch::new();

    for document in legacy {
        // Already copied by an earlier run
        if existing.contains(&document.id) {
            continue;
        }

        let mut fields = document.fields;
        let stored_created = fields.remove(CREATED_AT_FIELD);
        let original_created = document
            .created_at
            .map(|timestamp| Value::String(clock::canonical(timestamp)))
            .or(stored_created);
        if let Some(value) = original_created {
            fields.insert(ORIGINAL_CREATED_AT_FIELD.to_string(), value);
        }
        fields.insert(
            MIGRATED_AT_FIELD.to_string(),
            Value::String(migrated_at.clone()),
        );
        fields.insert(USER_ID_FIELD.to_string(), Value::String(tenant.to_string()));

        batch.set(current_path.doc(document.id), fields);
    }

    let migrated = batch.len();
    if migrated > 0 {
        if let Err(e) = db.commit_batch(batch).await {
            tracing::warn!("Migration batch failed for {}: {}", current_path, e);
            return CollectionMigration::failed(collection, total, e.to_string());
        }
    }

    tracing::info!(
        "Migrated {}/{} documents for {} ({})",
        migrated,
        total,
        collection,
        tenant
    );
    CollectionMigration::completed(collection, migrated, total)
}

/// Report, per collection, how many documents sit at each layout and
/// whether migration is still needed. All collections are checked
/// concurrently; an unreachable path counts as zero.
pub async fn check_migration<D: DocumentDatabase>(
    db: &D,
    tenant: &TenantId,
) -> Vec<MigrationStatus> {
    let checks = Collection::ALL.map(|collection| check_collection(db, tenant, collection));
    join_all(checks).await
}

async fn check_collection<D: DocumentDatabase>(
    db: &D,
    tenant: &TenantId,
    collection: Collection,
) -> MigrationStatus {
    let legacy_count =
        count_documents(db, &CollectionPath::legacy(tenant.clone(), collection)).await;
    let current_count =
        count_documents(db, &CollectionPath::current(tenant.clone(), collection)).await;

    MigrationStatus {
        collection,
        legacy_count,
        current_count,
        needs_migration: legacy_count > 0 && current_count == 0,
    }
}

async fn count_documents<D: DocumentDatabase>(db: &D, path: &CollectionPath) -> usize {
    match db.fetch_all(path).await {
        Ok(documents) => documents.len(),
        Err(e) => {
            tracing::debug!("Counting {} failed, treating as empty: {}", path, e);
            0
        }
    }
}

/// Push local-only records into the current remote layout.
///
/// Records whose ids the remote store already holds are skipped; the rest
/// land under their existing ids, locally minted `local-` ids included,
/// stamped the same way [`migrate_legacy`] stamps copies. The local cache
/// is left untouched.
pub async fn push_local<S, D>(kv: &S, db: &D, tenant: &TenantId) -> MigrationReport
where
    S: KeyValueStore,
    D: DocumentDatabase,
{
    let mut collections = Vec::with_capacity(Collection::ALL.len());
    for collection in Collection::ALL {
        collections.push(push_collection(kv, db, tenant, collection).await);
    }
    MigrationReport { collections }
}

async fn push_collection<S, D>(
    kv: &S,
    db: &D,
    tenant: &TenantId,
    collection: Collection,
) -> CollectionMigration
where
    S: KeyValueStore,
    D: DocumentDatabase,
{
    let records = local::read(kv, collection, tenant);
    let total = records.len();
    let current_path = CollectionPath::current(tenant.clone(), collection);

    let existing = match existing_ids(db, &current_path).await {
        Ok(ids) => ids,
        Err(e) => return CollectionMigration::failed(collection, total, e.to_string()),
    };

    let migrated_at = clock::now();
    let mut batch = WriteBatch::new();

    for record in records {
        if existing.contains(&record.id) {
            continue;
        }
        let id = record.id.clone();
        batch.set(current_path.doc(id), push_fields(record, tenant, &migrated_at));
    }

    let migrated = batch.len();
    if migrated > 0 {
        if let Err(e) = db.commit_batch(batch).await {
            tracing::warn!("Local push batch failed for {}: {}", current_path, e);
            return CollectionMigration::failed(collection, total, e.to_string());
        }
    }

    tracing::info!(
        "Pushed {}/{} local records for {} ({})",
        migrated,
        total,
        collection,
        tenant
    );
    CollectionMigration::completed(collection, migrated, total)
}

async fn existing_ids<D: DocumentDatabase>(
    db: &D,
    path: &CollectionPath,
) -> Result<HashSet<String>, RemoteError> {
    let documents = db.fetch_all(path).await.map_err(|e| {
        tracing::warn!("Migration could not read {}: {}", path, e);
        e
    })?;
    Ok(documents.into_iter().map(|document| document.id).collect())
}

fn push_fields(record: Record, tenant: &TenantId, migrated_at: &str) -> FieldMap {
    let mut fields = record.fields;
    if let Some(created_at) = record.created_at {
        fields.insert(
            ORIGINAL_CREATED_AT_FIELD.to_string(),
            Value::String(created_at),
        );
    }
    fields.insert(
        MIGRATED_AT_FIELD.to_string(),
        Value::String(migrated_at.to_string()),
    );
    fields.insert(USER_ID_FIELD.to_string(), Value::String(tenant.to_string()));
    fields
}
