//! CheckOrganizationAccessHandler - Authorization gate for a single organization.

use std::sync::Arc;

use crate::domain::foundation::{ExternalUserId, OrganizationId};
use crate::domain::organization::{AccessError, OrganizationAccess};
use crate::ports::{MembershipRepository, OrganizationRepository, UserRepository};

/// Query to check whether a subject may read an organization.
#[derive(Debug, Clone)]
pub struct CheckOrganizationAccessQuery {
    pub external_user_id: ExternalUserId,
    pub organization_id: OrganizationId,
}

/// Handler that resolves subject, then membership, then organization.
///
/// A caller who is not a member gets `Forbidden` even when the organization
/// does not exist, so non-members cannot probe for organization ids.
pub struct CheckOrganizationAccessHandler {
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl CheckOrganizationAccessHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        memberships: Arc<dyn MembershipRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            users,
            memberships,
            organizations,
        }
    }

    pub async fn handle(
        &self,
        query: CheckOrganizationAccessQuery,
    ) -> Result<OrganizationAccess, AccessError> {
        let user = self
            .users
            .find_by_external_id(&query.external_user_id)
            .await?
            .ok_or(AccessError::Unauthenticated)?;

        let membership = self
            .memberships
            .find(&query.organization_id, &user.id)
            .await?
            .ok_or(AccessError::Forbidden)?;

        let organization = self
            .organizations
            .find_by_id(&query.organization_id)
            .await?
            .ok_or(AccessError::NotFound)?;

        Ok(OrganizationAccess {
            organization,
            role: membership.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;
    use crate::domain::foundation::{DomainError, ExternalOrgId, UserId};
    use crate::domain::organization::{
        MemberRole, NewMembership, Organization, OrganizationProfile,
        OrganizationWithRole,
    };
    use crate::domain::user::{User, UserProfile};
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn handler(directory: &InMemoryDirectory) -> CheckOrganizationAccessHandler {
        CheckOrganizationAccessHandler::new(
            Arc::new(directory.clone()),
            Arc::new(directory.clone()),
            Arc::new(directory.clone()),
        )
    }

    fn query(user: &str, organization_id: OrganizationId) -> CheckOrganizationAccessQuery {
        CheckOrganizationAccessQuery {
            external_user_id: ExternalUserId::new(user).unwrap(),
            organization_id,
        }
    }

    async fn seed_user(directory: &InMemoryDirectory, ext: &str) -> User {
        UserRepository::upsert(
            directory,
            UserProfile::new(ExternalUserId::new(ext).unwrap(), format!("{ext}@example.com")),
        )
        .await
        .unwrap()
    }

    async fn seed_org(directory: &InMemoryDirectory, ext: &str) -> Organization {
        OrganizationRepository::upsert(
            directory,
            OrganizationProfile::new(ExternalOrgId::new(ext).unwrap(), "Acme", ext),
        )
        .await
        .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Gate Order Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn member_is_granted_with_role() {
        let directory = InMemoryDirectory::new();
        let user = seed_user(&directory, "user_1").await;
        let org = seed_org(&directory, "org_1").await;
        directory
            .create_if_absent(NewMembership::new(org.id, user.id, MemberRole::Admin))
            .await
            .unwrap();

        let access = handler(&directory).handle(query("user_1", org.id)).await.unwrap();

        assert_eq!(access.organization.id, org.id);
        assert_eq!(access.role, MemberRole::Admin);
    }

    #[tokio::test]
    async fn unknown_subject_is_unauthenticated() {
        let directory = InMemoryDirectory::new();
        let org = seed_org(&directory, "org_1").await;

        let err = handler(&directory)
            .handle(query("user_missing", org.id))
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Unauthenticated));
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let directory = InMemoryDirectory::new();
        seed_user(&directory, "user_1").await;
        let org = seed_org(&directory, "org_1").await;

        let err = handler(&directory).handle(query("user_1", org.id)).await.unwrap_err();

        assert!(matches!(err, AccessError::Forbidden));
    }

    #[tokio::test]
    async fn non_member_of_missing_org_is_forbidden_not_not_found() {
        let directory = InMemoryDirectory::new();
        seed_user(&directory, "user_1").await;

        let err = handler(&directory)
            .handle(query("user_1", OrganizationId::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Forbidden));
    }

    #[tokio::test]
    async fn storage_failure_is_infrastructure() {
        let directory = InMemoryDirectory::new();
        directory.set_unavailable(true);

        let err = handler(&directory)
            .handle(query("user_1", OrganizationId::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Infrastructure(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Dangling Membership
    // ════════════════════════════════════════════════════════════════════════════

    /// Organization lookup that always misses, to reach the third gate step.
    struct EmptyOrganizations;

    #[async_trait]
    impl OrganizationRepository for EmptyOrganizations {
        async fn upsert_with_owner(
            &self,
            _: OrganizationProfile,
            _: Option<UserId>,
        ) -> Result<Organization, DomainError> {
            unimplemented!()
        }

        async fn find_by_external_id(
            &self,
            _: &ExternalOrgId,
        ) -> Result<Option<Organization>, DomainError> {
            Ok(None)
        }

        async fn find_by_id(&self, _: &OrganizationId) -> Result<Option<Organization>, DomainError> {
            Ok(None)
        }

        async fn list_for_user(&self, _: &UserId) -> Result<Vec<OrganizationWithRole>, DomainError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn member_of_missing_org_is_not_found() {
        let directory = InMemoryDirectory::new();
        let user = seed_user(&directory, "user_1").await;
        let org = seed_org(&directory, "org_1").await;
        directory
            .create_if_absent(NewMembership::new(org.id, user.id, MemberRole::Member))
            .await
            .unwrap();

        let handler = CheckOrganizationAccessHandler::new(
            Arc::new(directory.clone()),
            Arc::new(directory.clone()),
            Arc::new(EmptyOrganizations),
        );

        let err = handler.handle(query("user_1", org.id)).await.unwrap_err();

        assert!(matches!(err, AccessError::NotFound));
    }
}
