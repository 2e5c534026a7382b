//! Client-side timestamps and offline record ids.
//!
//! All timestamps written by this layer use one canonical textual form:
//! RFC 3339 with millisecond precision and a `Z` suffix, the shape the
//! legacy web client produced and persisted everywhere.

use chrono::{DateTime, SecondsFormat, Utc};

/// Prefix of ids minted for records created while the remote store is
/// unreachable.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Render a timestamp in the canonical textual form.
pub fn canonical(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time in canonical textual form.
pub fn now() -> String {
    canonical(Utc::now())
}

/// Mint an id for a record that could not be created remotely.
///
/// Shape: `local-<epoch millis>-<random suffix>`. The millis keep rough
/// creation order visible; the suffix keeps two offline creates within the
/// same millisecond apart.
pub fn offline_record_id(timestamp: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}{}-{}",
        LOCAL_ID_PREFIX,
        timestamp.timestamp_millis(),
        &suffix[..8]
    )
}
