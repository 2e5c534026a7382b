//! Local key-value storage backends.
//!
//! The local side of the sync layer persists whole JSON blobs under string
//! keys, the way the legacy client used browser localStorage. Backends are
//! synchronous and never fail upward: a write that cannot complete is
//! logged at the backend and the call returns.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A string key-value store.
///
/// Implementations share localStorage's contract: reads of absent keys
/// yield `None`, writes replace wholesale, and no operation raises.
pub trait KeyValueStore: Send + Sync {
    /// Read the value at `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` at `key`, replacing any existing value.
    fn set(&self, key: &str, value: String);

    /// Delete the value at `key`. Absent keys are a no-op.
    fn remove(&self, key: &str);
}
