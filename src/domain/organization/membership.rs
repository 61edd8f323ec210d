//! Organization memberships.

use crate::domain::foundation::{MembershipId, OrganizationId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use super::{MemberRole, Organization};

/// Request to link a user to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub external_id: Option<String>,
}

impl NewMembership {
    pub fn new(organization_id: OrganizationId, user_id: UserId, role: MemberRole) -> Self {
        Self {
            organization_id,
            user_id,
            role,
            external_id: None,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// A user's membership in an organization.
///
/// # Invariants
///
/// - at most one membership per `(organization_id, user_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub external_id: Option<String>,
    pub joined_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Membership {
    /// Materializes a membership joined now.
    pub fn join(request: NewMembership) -> Self {
        let now = Timestamp::now();
        Self {
            id: MembershipId::new(),
            organization_id: request.organization_id,
            user_id: request.user_id,
            role: request.role,
            external_id: request.external_id,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this membership links the given pair.
    pub fn links(&self, organization_id: &OrganizationId, user_id: &UserId) -> bool {
        &self.organization_id == organization_id && &self.user_id == user_id
    }
}

/// An organization as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationWithRole {
    pub organization: Organization,
    pub role: MemberRole,
    pub joined_at: Timestamp,
}
