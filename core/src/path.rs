//! Typed remote document paths.
//!
//! Two layouts exist side by side: the current per-company layout and the
//! deeply nested legacy layout, kept only as a migration source. Building
//! paths through these types keeps the layouts in one place instead of
//! scattered across format strings.

use crate::{Collection, RecordId, TenantId};
use std::fmt;

/// Which remote layout a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// `companies/<tenantId>/<collection>`
    Current,
    /// `users/<tenantId>/<tenantId>/documents/<collection>/items`
    Legacy,
}

/// Path of one tenant's remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    tenant: TenantId,
    collection: Collection,
    layout: Layout,
}

impl CollectionPath {
    /// Path under the current layout.
    pub fn current(tenant: TenantId, collection: Collection) -> Self {
        Self {
            tenant,
            collection,
            layout: Layout::Current,
        }
    }

    /// Path under the superseded layout. Only migration reads this.
    pub fn legacy(tenant: TenantId, collection: Collection) -> Self {
        Self {
            tenant,
            collection,
            layout: Layout::Legacy,
        }
    }

    /// The owning tenant.
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// The addressed collection.
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// The layout this path belongs to.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Address a single document under this path.
    pub fn doc(&self, id: impl Into<RecordId>) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layout {
            Layout::Current => write!(f, "companies/{}/{}", self.tenant, self.collection),
            Layout::Legacy => write!(
                f,
                "users/{}/{}/documents/{}/items",
                self.tenant, self.tenant, self.collection
            ),
        }
    }
}

/// Path of a single remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    /// The containing collection path.
    pub collection: CollectionPath,
    /// The document id, equal to the last path segment.
    pub id: RecordId,
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
