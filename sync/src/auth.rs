//! Authentication surface consumed by the coordinator.
//!
//! The sync layer never talks to an auth service itself. It only asks the
//! two questions below to decide whether the remote store may be used.

/// Interface to the authentication layer.
pub trait AuthProvider: Send + Sync {
    /// Whether a principal is currently signed in.
    fn is_signed_in(&self) -> bool;

    /// Identifier of the signed-in principal, if any.
    fn principal_id(&self) -> Option<String>;
}

/// Fixed-answer [`AuthProvider`] for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticAuth {
    principal: Option<String>,
}

impl StaticAuth {
    /// A provider reporting `principal` as signed in.
    pub fn signed_in(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
        }
    }

    /// A provider with nobody signed in.
    pub fn signed_out() -> Self {
        Self { principal: None }
    }
}

impl AuthProvider for StaticAuth {
    fn is_signed_in(&self) -> bool {
        self.principal.is_some()
    }

    fn principal_id(&self) -> Option<String> {
        self.principal.clone()
    }
}
