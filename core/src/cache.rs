//! Cache keys and the persisted cache-entry codec.
//!
//! Each (collection, tenant) pair owns exactly one key holding a JSON
//! array of records in newest-first order. There is no per-record storage;
//! every mutation rewrites the whole array.

use crate::error::{Error, Result};
use crate::{Collection, Record, TenantId};

/// Key of the active-session record.
pub const SESSION_KEY: &str = "upsen_session";

/// Derive the cache key for a collection and tenant.
///
/// Known tenants get their own `<base>_<tenant>` key. The unknown sentinel
/// falls back to the bare base key, where pre-login data lives.
pub fn cache_key(collection: Collection, tenant: &TenantId) -> String {
    if tenant.is_unknown() {
        collection.base_key().to_string()
    } else {
        format!("{}_{}", collection.base_key(), tenant)
    }
}

/// Serialize a cache entry.
pub fn encode_records(records: &[Record]) -> Result<String> {
    serde_json::to_string(records).map_err(|e| Error::InvalidCacheEntry(e.to_string()))
}

/// Parse a cache entry, preserving stored order.
pub fn decode_records(raw: &str) -> Result<Vec<Record>> {
    serde_json::from_str(raw).map_err(|e| Error::InvalidCacheEntry(e.to_string()))
}
