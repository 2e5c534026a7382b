//! # Upsen Sync
//!
//! Local-first sync layer for the Upsen small-business ledger.
//!
//! Reads are served from a durable local cache once it holds anything;
//! the remote document store is consulted only to fill an empty cache and
//! to persist writes durably. Writes go remote-first and fall back to
//! local-only persistence, reporting the durability tier either way. The
//! design goal carried over from the legacy client: a flaky or absent
//! network must never interrupt whoever is doing the books.
//!
//! ## Components
//!
//! - [`SyncCoordinator`] - load/save/update/remove with the local-first
//!   policy and explicit [`Durability`] reporting
//! - [`store`] - the [`KeyValueStore`] surface with [`MemoryStore`] and
//!   [`FileStore`] backends
//! - [`remote`] - the [`DocumentDatabase`] surface, the typed adapter
//!   over it and the [`MemoryDatabase`] reference backend
//! - [`identity`] - session-record resolution and the tenant sentinel
//! - [`migrate`] - one-shot legacy-layout migration and local push
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use upsen_core::{Collection, FieldMap, Session, SessionUser};
//! use upsen_sync::{identity, MemoryDatabase, MemoryStore, StaticAuth, SyncCoordinator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let kv = MemoryStore::new();
//! identity::write_session(&kv, &Session::new(SessionUser::remote("company-1"), 0));
//!
//! let coordinator = SyncCoordinator::new(
//!     kv,
//!     Some(MemoryDatabase::new()),
//!     Some(StaticAuth::signed_in("company-1")),
//! );
//!
//! let mut fields = FieldMap::new();
//! fields.insert("amount".to_string(), json!(42));
//! let saved = coordinator.save(Collection::Expenses, fields).await;
//! assert!(saved.durability.is_remote());
//!
//! let expenses = coordinator.load(Collection::Expenses).await;
//! assert_eq!(expenses.len(), 1);
//! assert_eq!(expenses[0].id, saved.record.id);
//! # }
//! ```

pub mod auth;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod identity;
pub mod local;
pub mod migrate;
pub mod remote;
pub mod store;

// Re-export main types at crate root
pub use auth::{AuthProvider, StaticAuth};
pub use coordinator::{Durability, Saved, SyncCoordinator};
pub use error::{RemoteError, StoreError};
pub use migrate::{CollectionMigration, MigrationReport, MigrationStatus};
pub use remote::{DocumentDatabase, MemoryDatabase, RemoteDocument, WriteBatch};
pub use store::{FileStore, KeyValueStore, MemoryStore};
