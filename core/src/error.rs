//! Error types for the Upsen core.

use thiserror::Error;

/// All possible errors from the core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("cache entry is not a record array: {0}")]
    InvalidCacheEntry(String),

    #[error("session record is not valid: {0}")]
    InvalidSession(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
