//! Organization repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ExternalOrgId, OrganizationId, UserId};
use crate::domain::organization::{Organization, OrganizationProfile, OrganizationWithRole};

/// Repository port for organizations.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Inserts an organization or overwrites name, slug, description, and logo
    /// of the existing one with the same external id. No membership is granted.
    async fn upsert(&self, profile: OrganizationProfile) -> Result<Organization, DomainError> {
        self.upsert_with_owner(profile, None).await
    }

    /// Upserts the organization and, when `owner` is given, grants that user
    /// an Owner membership if they have none yet. Both writes commit together.
    ///
    /// An existing membership for the owner is left untouched, so replaying a
    /// creation event never duplicates or downgrades anything.
    async fn upsert_with_owner(
        &self,
        profile: OrganizationProfile,
        owner: Option<UserId>,
    ) -> Result<Organization, DomainError>;

    async fn find_by_external_id(
        &self,
        external_id: &ExternalOrgId,
    ) -> Result<Option<Organization>, DomainError>;

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError>;

    /// Lists the organizations a user belongs to with their role in each,
    /// most recently joined first.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<OrganizationWithRole>, DomainError>;
}
