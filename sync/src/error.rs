//! Error types at the sync layer's boundaries.
//!
//! Errors here never reach the surface API of the coordinator; its
//! operations are infallible and degrade instead. These types exist for
//! the adapters and backends underneath, where a failure still has to be
//! named before it is folded away.

use thiserror::Error;

/// Failure of a remote document-database call.
///
/// Backends fold their raw transport errors into these kinds at the
/// boundary; nothing backend-specific crosses it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote database is unavailable")]
    Unavailable,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("document not found: {0}")]
    NotFound(String),
}

/// Failure opening or persisting a file-backed store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid: {0}")]
    Corrupt(String),
}
