//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, authentication types, and the error
//! vocabulary shared by every other domain module.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedSubject};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ExternalOrgId, ExternalUserId, MembershipId, OrganizationId, UserId};
pub use timestamp::Timestamp;
