//! The sync coordinator: local-first reads, remote-first writes with
//! local fallback.
//!
//! Policy carried over from the legacy client: the remote store is
//! authoritative only the first time a collection is loaded; once the
//! local cache holds anything, the cache wins and the remote store is not
//! even consulted. Writes go remote-first and degrade to local-only
//! persistence when the remote store is unreachable or fails. No
//! operation here ever returns an error - the [`Durability`] tier in the
//! write results is how a degraded outcome is surfaced.

use crate::auth::AuthProvider;
use crate::remote::DocumentDatabase;
use crate::store::KeyValueStore;
use crate::{clock, identity, local, remote};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use upsen_core::{Collection, CollectionPath, FieldMap, Record};

/// Whether a write reached the remote store or only the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Durability {
    /// Persisted remotely and cached locally.
    Remote,
    /// Persisted in the local cache only. The record reaches the remote
    /// store on the next local push.
    LocalOnly,
}

impl Durability {
    /// Whether the write reached the remote store.
    pub fn is_remote(&self) -> bool {
        matches!(self, Durability::Remote)
    }
}

/// Outcome of [`SyncCoordinator::save`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Saved {
    /// The record as written to the cache, id and timestamps included.
    pub record: Record,
    /// How durably the record was persisted.
    pub durability: Durability,
}

/// Orchestrates the local cache and the remote store.
///
/// The remote handles are optional: a coordinator built with `None` for
/// either works purely locally from the start. The tenant is re-resolved
/// from the session record on every operation, so a login or logout
/// between calls switches data partitions without rebuilding anything.
///
/// All four operations serialize on one internal gate, making each
/// read-modify-write of a cache entry atomic with respect to the others.
/// The gate is per-coordinator: callers sharing one backing store across
/// multiple coordinators must serialize access themselves.
pub struct SyncCoordinator<S, D, A> {
    kv: S,
    db: Option<D>,
    auth: Option<A>,
    gate: Mutex<()>,
}

impl<S, D, A> SyncCoordinator<S, D, A>
where
    S: KeyValueStore,
    D: DocumentDatabase,
    A: AuthProvider,
{
    /// Create a coordinator over a local store and optional remote
    /// handles.
    pub fn new(kv: S, db: Option<D>, auth: Option<A>) -> Self {
        Self {
            kv,
            db,
            auth,
            gate: Mutex::new(()),
        }
    }

    /// The local store handle.
    pub fn store(&self) -> &S {
        &self.kv
    }

    /// Whether the remote store may currently be used.
    ///
    /// Requires all three: a database handle, an auth handle, and a
    /// signed-in principal. Anything less and every operation quietly
    /// works local-only.
    pub fn remote_reachable(&self) -> bool {
        let signed_in = self
            .auth
            .as_ref()
            .map(|auth| auth.is_signed_in())
            .unwrap_or(false);
        self.db.is_some() && signed_in
    }

    fn reachable_db(&self) -> Option<&D> {
        if self.remote_reachable() {
            self.db.as_ref()
        } else {
            None
        }
    }

    /// Load a collection for the current tenant.
    ///
    /// A non-empty cache wins outright. An empty cache is populated from
    /// the remote store when it is reachable; otherwise the result is
    /// empty. Never fails.
    pub async fn load(&self, collection: Collection) -> Vec<Record> {
        let _guard = self.gate.lock().await;
        let tenant = identity::current_tenant_id(&self.kv);

        let cached = local::read(&self.kv, collection, &tenant);
        if !cached.is_empty() {
            return cached;
        }

        let db = match self.reachable_db() {
            Some(db) => db,
            None => return Vec::new(),
        };

        let path = CollectionPath::current(tenant.clone(), collection);
        match remote::fetch_all(db, &path).await {
            Ok(records) => {
                local::write_all(&self.kv, collection, &tenant, &records);
                tracing::info!(
                    "Populated {} cache for {} with {} records",
                    collection,
                    tenant,
                    records.len()
                );
                records
            }
            Err(_) => Vec::new(),
        }
    }

    /// Save a new record.
    ///
    /// Remote-first: when reachable, the record is created remotely and
    /// cached under the server-assigned id. On any remote failure the
    /// record is cached under a locally minted id instead. The call always
    /// succeeds; [`Saved::durability`] says which path was taken.
    pub async fn save(&self, collection: Collection, fields: FieldMap) -> Saved {
        let _guard = self.gate.lock().await;
        let tenant = identity::current_tenant_id(&self.kv);
        let now = Utc::now();

        if let Some(db) = self.reachable_db() {
            let path = CollectionPath::current(tenant.clone(), collection);
            match remote::add(db, &path, &tenant, fields.clone()).await {
                Ok(id) => {
                    let mut record = Record::new(id, fields);
                    record.stamp_created(clock::canonical(now));
                    local::prepend(&self.kv, collection, &tenant, record.clone());
                    return Saved {
                        record,
                        durability: Durability::Remote,
                    };
                }
                Err(e) => {
                    tracing::warn!("Save degraded to local-only for {}: {}", collection, e);
                }
            }
        }

        let mut record = Record::new(clock::offline_record_id(now), fields);
        record.stamp_created(clock::canonical(now));
        local::prepend(&self.kv, collection, &tenant, record.clone());
        Saved {
            record,
            durability: Durability::LocalOnly,
        }
    }

    /// Update a record by id.
    ///
    /// The remote update is attempted first and is best-effort; the local
    /// cache is updated regardless, stamping a fresh update time. Never
    /// fails.
    pub async fn update(&self, collection: Collection, id: &str, fields: FieldMap) -> Durability {
        let _guard = self.gate.lock().await;
        let tenant = identity::current_tenant_id(&self.kv);
        let now = clock::canonical(Utc::now());

        let mut durability = Durability::LocalOnly;
        if let Some(db) = self.reachable_db() {
            let path = CollectionPath::current(tenant.clone(), collection);
            if remote::update(db, &path, id, fields.clone()).await.is_ok() {
                durability = Durability::Remote;
            }
        }

        local::merge_fields(&self.kv, collection, &tenant, id, &fields, &now);
        durability
    }

    /// Remove a record by id.
    ///
    /// Symmetric to [`update`](Self::update): the remote delete is
    /// best-effort, local removal always happens. Never fails.
    pub async fn remove(&self, collection: Collection, id: &str) -> Durability {
        let _guard = self.gate.lock().await;
        let tenant = identity::current_tenant_id(&self.kv);

        let mut durability = Durability::LocalOnly;
        if let Some(db) = self.reachable_db() {
            let path = CollectionPath::current(tenant.clone(), collection);
            if remote::remove(db, &path, id).await.is_ok() {
                durability = Durability::Remote;
            }
        }

        local::remove(&self.kv, collection, &tenant, id);
        durability
    }
}
