//! Mock authentication adapter for testing.
//!
//! # Example
//!
//! ```ignore
//! use identity_sync::adapters::auth::MockSessionValidator;
//!
//! let validator = MockSessionValidator::new()
//!     .with_subject("valid-token", "user_2abc")
//!     .with_org_subject("org-token", "user_2abc", "org_2xyz");
//!
//! assert!(validator.validate("valid-token").await.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedSubject, ExternalOrgId, ExternalUserId};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to subjects. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedSubject>>,
    /// Returned for every validation when set
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a subject.
    pub fn with_user(self, token: impl Into<String>, subject: AuthenticatedSubject) -> Self {
        self.add_token(token, subject);
        self
    }

    /// Adds a valid token for a provider user id with no active organization.
    pub fn with_subject(self, token: impl Into<String>, external_user_id: &str) -> Self {
        let subject = AuthenticatedSubject::new(
            ExternalUserId::new(external_user_id).expect("test user id must not be empty"),
        );
        self.with_user(token, subject)
    }

    /// Adds a valid token whose session has an active organization.
    pub fn with_org_subject(
        self,
        token: impl Into<String>,
        external_user_id: &str,
        external_org_id: &str,
    ) -> Self {
        let subject = AuthenticatedSubject::new(
            ExternalUserId::new(external_user_id).expect("test user id must not be empty"),
        )
        .with_active_org(ExternalOrgId::new(external_org_id).expect("test org id must not be empty"));
        self.with_user(token, subject)
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self.force_error.write().unwrap() = None;
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, subject: AuthenticatedSubject) {
        self.tokens.write().unwrap().insert(token.into(), subject);
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
