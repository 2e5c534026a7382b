//! # Upsen Core
//!
//! Deterministic core types for the Upsen local-first sync layer.
//!
//! This crate defines the vocabulary the sync layer speaks: collections,
//! tenants, the record envelope, cache keys and remote paths. Everything
//! here is pure - no IO, no clock, no async - so the same inputs always
//! produce the same keys, paths and serialized forms.
//!
//! The companion `upsen-sync` crate layers storage backends, the sync
//! coordinator and the migration utility on top of these types.
//!
//! ## Core Concepts
//!
//! ### Collections
//!
//! The synced data sets form a closed enum, [`Collection`]. Cache keys and
//! remote paths are always derived through it, never assembled from string
//! literals at call sites.
//!
//! ### Tenants
//!
//! A [`TenantId`] partitions all data per user/company. When no session
//! exists the sentinel [`TenantId::unknown`] is used, which maps to the
//! un-suffixed cache keys where pre-login data lives.
//!
//! ### Records
//!
//! A [`Record`] is a typed envelope (id plus optional textual timestamps)
//! over an open [`FieldMap`] of domain attributes. On the wire the two
//! share one flat JSON object, so existing persisted data parses as-is.
//!
//! ### Cache entries
//!
//! Each (collection, tenant) pair owns one storage key - see
//! [`cache_key`] - holding a JSON array of records, newest first. The
//! codec lives in [`cache`].
//!
//! ### Remote paths
//!
//! [`CollectionPath`] renders the current `companies/...` layout and the
//! legacy `users/...` layout used only as a migration source.
//!
//! ## Quick Start
//!
//! ```rust
//! use upsen_core::{cache, Collection, FieldMap, Record, TenantId};
//! use serde_json::json;
//!
//! // Records carry a typed envelope; domain fields pass through opaquely.
//! let mut fields = FieldMap::new();
//! fields.insert("amount".to_string(), json!(42));
//! fields.insert("category".to_string(), json!("Travel"));
//! let record = Record::new("exp-1", fields);
//!
//! // Each (collection, tenant) pair owns one namespaced cache key.
//! let tenant = TenantId::new("company-1");
//! let key = cache::cache_key(Collection::Expenses, &tenant);
//! assert_eq!(key, "upsen_expenses_company-1");
//!
//! // Cache entries are JSON arrays in stored order.
//! let raw = cache::encode_records(&[record]).unwrap();
//! let decoded = cache::decode_records(&raw).unwrap();
//! assert_eq!(decoded[0].id, "exp-1");
//! ```

pub mod cache;
pub mod collection;
pub mod error;
pub mod path;
pub mod record;
pub mod tenant;

// Re-export main types at crate root
pub use cache::{cache_key, decode_records, encode_records, SESSION_KEY};
pub use collection::Collection;
pub use error::Error;
pub use path::{CollectionPath, DocumentPath, Layout};
pub use record::{Record, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
pub use tenant::{Session, SessionUser, TenantId};

/// Type aliases for clarity
pub type RecordId = String;
pub type FieldMap = serde_json::Map<String, serde_json::Value>;
