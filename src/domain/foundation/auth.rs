//! Authentication types for the domain layer.
//!
//! An `AuthenticatedSubject` is what survives a successful bearer-token check:
//! the provider's user id and, when the session has one, the active
//! organization. Provider adapters populate it via the `SessionValidator` port.

use super::{ExternalOrgId, ExternalUserId};
use thiserror::Error;

/// Caller identity extracted from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    /// The `sub` claim: the provider's user id.
    pub external_user_id: ExternalUserId,

    /// Organization selected in the caller's session, if any.
    pub active_org_id: Option<ExternalOrgId>,
}

impl AuthenticatedSubject {
    /// Creates a subject with no active organization.
    pub fn new(external_user_id: ExternalUserId) -> Self {
        Self {
            external_user_id,
            active_org_id: None,
        }
    }

    /// Sets the active organization.
    pub fn with_active_org(mut self, org: ExternalOrgId) -> Self {
        self.active_org_id = Some(org);
        self
    }
}

/// Authentication failures. All of them surface to callers as 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No Authorization header on the request.
    #[error("Authorization header required")]
    MissingHeader,

    /// Header present but not of the form `Bearer <token>`.
    #[error("Invalid authorization header format")]
    MalformedHeader,

    /// Signature, expiry, issuer, party, or key lookup failed.
    #[error("Invalid or expired token")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_without_org_has_none() {
        let subject = AuthenticatedSubject::new(ExternalUserId::new("user_1").unwrap());
        assert!(subject.active_org_id.is_none());
    }

    #[test]
    fn subject_with_active_org_keeps_it() {
        let subject = AuthenticatedSubject::new(ExternalUserId::new("user_1").unwrap())
            .with_active_org(ExternalOrgId::new("org_1").unwrap());
        assert_eq!(subject.active_org_id.unwrap().as_str(), "org_1");
    }

    #[test]
    fn auth_error_messages() {
        assert_eq!(
            AuthError::MissingHeader.to_string(),
            "Authorization header required"
        );
        assert_eq!(
            AuthError::MalformedHeader.to_string(),
            "Invalid authorization header format"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid or expired token");
    }
}
