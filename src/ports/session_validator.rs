//! Session validation port for bearer token verification.
//!
//! Provider-agnostic: the Clerk adapter verifies real session tokens, the mock
//! adapter serves tests.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Signature**: against the configured key material
//! - **Expiry (exp, nbf)**: token must be currently valid
//! - **Subject (sub)**: must be present

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedSubject};

/// Validates session tokens and extracts the caller's identity.
///
/// # Contract
///
/// Every failure (bad signature, expired, unknown key, provider unreachable)
/// is reported as `AuthError::InvalidToken`.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError>;
}
