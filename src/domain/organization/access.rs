//! Result types for the organization access check.

use thiserror::Error;

use crate::domain::foundation::DomainError;

use super::{MemberRole, Organization};

/// A granted view of an organization with the caller's role in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationAccess {
    pub organization: Organization,
    pub role: MemberRole,
}

/// Why access to an organization was refused.
///
/// The variants are checked in this order: caller, membership, organization.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// The token's subject has no provisioned user.
    #[error("User not found")]
    Unauthenticated,

    /// The user is not a member of the organization.
    #[error("Access denied")]
    Forbidden,

    /// The membership exists but the organization does not.
    #[error("Organization not found")]
    NotFound,

    #[error("Storage failure: {0}")]
    Infrastructure(#[from] DomainError),
}
