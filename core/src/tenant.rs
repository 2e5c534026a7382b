//! Tenant identity and the active-session record.

use crate::error::{Error, Result};
use crate::FieldMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel tenant used whenever no usable session exists.
const UNKNOWN_TENANT: &str = "unknown";

/// Identifier of the user or company owning a data partition.
///
/// Every cache key and remote path embeds a tenant id, so data from two
/// accounts on the same device never mixes.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel returned when no session is present or readable.
    pub fn unknown() -> Self {
        Self(UNKNOWN_TENANT.to_string())
    }

    /// Whether this is the sentinel tenant.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_TENANT
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in user profile as kept in the session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Identifier assigned by the remote auth service, when the account
    /// has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Locally generated identifier for accounts created offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Remaining profile attributes, passed through opaquely.
    #[serde(flatten)]
    pub profile: FieldMap,
}

impl SessionUser {
    /// Profile for an account known to the remote auth service.
    pub fn remote(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            id: None,
            profile: FieldMap::new(),
        }
    }

    /// Profile for an account created locally, before any remote signup.
    pub fn local(id: impl Into<String>) -> Self {
        Self {
            uid: None,
            id: Some(id.into()),
            profile: FieldMap::new(),
        }
    }
}

/// The active-session record persisted under
/// [`SESSION_KEY`](crate::cache::SESSION_KEY).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The signed-in user profile.
    pub user: SessionUser,
    /// When the session was opened, in milliseconds since epoch.
    pub login_time: i64,
}

impl Session {
    /// Create a session opened at `login_time`.
    pub fn new(user: SessionUser, login_time: i64) -> Self {
        Self { user, login_time }
    }

    /// Parse a persisted session record.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::InvalidSession(e.to_string()))
    }

    /// Serialize for persistence.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSession(e.to_string()))
    }

    /// The tenant this session belongs to.
    ///
    /// Prefers the remote-auth id over the locally generated one. An empty
    /// or missing identifier yields the unknown sentinel rather than an
    /// empty tenant.
    pub fn tenant_id(&self) -> TenantId {
        self.user
            .uid
            .as_deref()
            .filter(|uid| !uid.is_empty())
            .or_else(|| self.user.id.as_deref().filter(|id| !id.is_empty()))
            .map(TenantId::new)
            .unwrap_or_else(TenantId::unknown)
    }
}
