//! Membership repository port.
//!
//! Memberships are addressed by the `(organization, user)` pair throughout.
//! The provider's membership id is stored for reference but never used as a
//! key.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrganizationId, UserId};
use crate::domain::organization::{Membership, NewMembership};

/// Repository port for organization memberships.
///
/// Implementations must enforce at most one membership per pair.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Creates the membership unless the pair is already linked.
    ///
    /// Returns `true` if a row was inserted, `false` if one already existed.
    /// An existing row keeps its role.
    async fn create_if_absent(&self, membership: NewMembership) -> Result<bool, DomainError>;

    /// Find the membership linking a pair.
    async fn find(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError>;

    /// Deletes the membership linking a pair.
    ///
    /// Returns `true` if a row was removed, `false` if there was none.
    async fn delete(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<bool, DomainError>;
}
