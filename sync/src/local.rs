//! Local store adapter: whole-array reads and rewrites over a
//! [`KeyValueStore`].
//!
//! There is no per-record persistence primitive. Every mutation reads the
//! cache entry, rewrites the array and stores it back, the way the legacy
//! client treated localStorage. Reads never fail: anything unreadable is
//! logged and treated as an empty cache.

use crate::store::KeyValueStore;
use upsen_core::{cache, Collection, FieldMap, Record, TenantId};

/// Read the cached records for `(collection, tenant)`, in stored order.
pub fn read<S: KeyValueStore>(kv: &S, collection: Collection, tenant: &TenantId) -> Vec<Record> {
    let key = cache::cache_key(collection, tenant);
    match kv.get(&key) {
        None => Vec::new(),
        Some(raw) => match cache::decode_records(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e);
                Vec::new()
            }
        },
    }
}

/// Replace the cache entry for `(collection, tenant)` wholesale.
pub fn write_all<S: KeyValueStore>(
    kv: &S,
    collection: Collection,
    tenant: &TenantId,
    records: &[Record],
) {
    let key = cache::cache_key(collection, tenant);
    match cache::encode_records(records) {
        Ok(raw) => kv.set(&key, raw),
        Err(e) => tracing::warn!("Failed to encode cache entry {}: {}", key, e),
    }
}

/// Insert `record` at the front of the cache entry, keeping newest first.
pub fn prepend<S: KeyValueStore>(
    kv: &S,
    collection: Collection,
    tenant: &TenantId,
    record: Record,
) {
    let mut records = read(kv, collection, tenant);
    records.insert(0, record);
    write_all(kv, collection, tenant, &records);
}

/// Overlay `fields` onto the cached record `id` and stamp its update
/// time. Returns whether the id was present.
pub fn merge_fields<S: KeyValueStore>(
    kv: &S,
    collection: Collection,
    tenant: &TenantId,
    id: &str,
    fields: &FieldMap,
    updated_at: &str,
) -> bool {
    let mut records = read(kv, collection, tenant);
    match records.iter_mut().find(|record| record.id == id) {
        Some(record) => {
            record.merge_fields(fields, updated_at);
            write_all(kv, collection, tenant, &records);
            true
        }
        None => false,
    }
}

/// Drop the cached record `id`. Returns whether the id was present.
pub fn remove<S: KeyValueStore>(
    kv: &S,
    collection: Collection,
    tenant: &TenantId,
    id: &str,
) -> bool {
    let mut records = read(kv, collection, tenant);
    let before = records.len();
    records.retain(|record| record.id != id);
    if records.len() == before {
        return false;
    }
    write_all(kv, collection, tenant, &records);
    true
}
