//! Identity resolution from the persisted session record.
//!
//! Whoever is signed in is whatever the session record says. The record is
//! re-read on every resolution, so a login or logout between operations
//! switches the data partition without any coordinator rebuild.

use crate::store::KeyValueStore;
use upsen_core::{Session, TenantId, SESSION_KEY};

/// Resolve the tenant owning the current session.
///
/// An absent or unreadable session record yields the unknown sentinel.
/// This never fails and never raises.
pub fn current_tenant_id<S: KeyValueStore>(kv: &S) -> TenantId {
    match kv.get(SESSION_KEY) {
        None => TenantId::unknown(),
        Some(raw) => match Session::from_json(&raw) {
            Ok(session) => session.tenant_id(),
            Err(e) => {
                tracing::debug!("Ignoring unreadable session record: {}", e);
                TenantId::unknown()
            }
        },
    }
}

/// Install `session` as the active session.
pub fn write_session<S: KeyValueStore>(kv: &S, session: &Session) {
    match session.to_json() {
        Ok(raw) => kv.set(SESSION_KEY, raw),
        Err(e) => tracing::warn!("Failed to serialize session record: {}", e),
    }
}

/// Remove the active session.
pub fn clear_session<S: KeyValueStore>(kv: &S) {
    kv.remove(SESSION_KEY);
}
