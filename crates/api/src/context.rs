use clientdesk_auth::Identity;
use clientdesk_core::{DomainError, DomainResult};

/// Caller context for a request.
///
/// Attached to every request by the auth middleware. `None` means no valid
/// bearer token was presented; the access policy decides what that allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    identity: Option<Identity>,
}

impl CallerContext {
    pub fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The identity, or `Unauthenticated` for anonymous callers.
    pub fn require(&self) -> DomainResult<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| DomainError::unauthenticated("authentication required"))
    }
}
