//! EventReconciler - Applies one identity event to storage.
//!
//! Every transition is idempotent: users and organizations are upserted by
//! external id, and memberships are created or deleted by the
//! `(organization, user)` pair. Replaying a delivery converges to the same
//! state. Events that cannot be applied (missing fields, unresolvable ids)
//! are skipped rather than failed, so the provider stops redelivering them.

use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ExternalOrgId, ExternalUserId};
use crate::domain::organization::{NewMembership, Organization};
use crate::domain::user::User;
use crate::domain::webhook::{IdentityEvent, MembershipPayload, OrganizationPayload, UserPayload};
use crate::ports::{MembershipRepository, OrganizationRepository, UserRepository};

/// What reconciling an event did. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Storage was changed (or re-confirmed, for upserts).
    Applied,
    /// The event was understood but could not or need not be applied.
    Skipped(&'static str),
    /// The event type is not handled.
    Ignored,
    /// A storage operation failed.
    Failed(String),
}

impl ReconcileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Skipped(reason) => write!(f, "skipped: {}", reason),
            Self::Ignored => write!(f, "ignored"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

impl From<DomainError> for ReconcileOutcome {
    fn from(err: DomainError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Applies identity events through the persistence ports.
pub struct EventReconciler {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl EventReconciler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            users,
            organizations,
            memberships,
        }
    }

    /// Applies the event. Never retries and never returns an error; storage
    /// failures are reported as `ReconcileOutcome::Failed`.
    pub async fn reconcile(&self, event: &IdentityEvent) -> ReconcileOutcome {
        let result = match event {
            IdentityEvent::UserUpserted(payload) => self.upsert_user(payload).await,
            IdentityEvent::OrganizationUpserted(payload) => {
                self.upsert_organization(payload).await
            }
            IdentityEvent::MembershipCreated(payload) => self.create_membership(payload).await,
            IdentityEvent::MembershipDeleted(payload) => self.delete_membership(payload).await,
            IdentityEvent::Unknown(event_type) => {
                tracing::debug!(event_type = %event_type, "Ignoring unhandled event type");
                Ok(ReconcileOutcome::Ignored)
            }
        };

        result.unwrap_or_else(ReconcileOutcome::from)
    }

    async fn upsert_user(&self, payload: &UserPayload) -> Result<ReconcileOutcome, DomainError> {
        let Some(profile) = payload.profile() else {
            tracing::warn!(
                external_id = ?payload.external_id,
                "User event missing id or primary email"
            );
            return Ok(ReconcileOutcome::Skipped("missing user id or email"));
        };

        let user = self.users.upsert(profile).await?;
        tracing::info!(
            external_id = %user.external_id,
            user_id = %user.id,
            "User synced"
        );
        Ok(ReconcileOutcome::Applied)
    }

    async fn upsert_organization(
        &self,
        payload: &OrganizationPayload,
    ) -> Result<ReconcileOutcome, DomainError> {
        let Some(profile) = payload.profile() else {
            tracing::warn!(
                external_id = ?payload.external_id,
                "Organization event missing id, name, or slug"
            );
            return Ok(ReconcileOutcome::Skipped("missing organization id, name, or slug"));
        };

        let owner = match payload.creator() {
            Some(creator) => self.resolve_user(&creator).await?.map(|u| u.id),
            None => None,
        };

        let org = self.organizations.upsert_with_owner(profile, owner).await?;
        tracing::info!(
            external_id = %org.external_id,
            org_id = %org.id,
            owner_granted = owner.is_some(),
            "Organization synced"
        );
        Ok(ReconcileOutcome::Applied)
    }

    async fn create_membership(
        &self,
        payload: &MembershipPayload,
    ) -> Result<ReconcileOutcome, DomainError> {
        let (org, user) = match self.resolve_parties(payload).await? {
            Ok(parties) => parties,
            Err(reason) => return Ok(ReconcileOutcome::Skipped(reason)),
        };

        let mut request = NewMembership::new(org.id, user.id, payload.member_role());
        if let Some(external_id) = &payload.external_id {
            request = request.with_external_id(external_id.clone());
        }

        if self.memberships.create_if_absent(request).await? {
            tracing::info!(
                org_id = %org.id,
                user_id = %user.id,
                role = %payload.member_role(),
                "Membership created"
            );
            Ok(ReconcileOutcome::Applied)
        } else {
            tracing::debug!(org_id = %org.id, user_id = %user.id, "Membership already exists");
            Ok(ReconcileOutcome::Skipped("membership already exists"))
        }
    }

    async fn delete_membership(
        &self,
        payload: &MembershipPayload,
    ) -> Result<ReconcileOutcome, DomainError> {
        let (org, user) = match self.resolve_parties(payload).await? {
            Ok(parties) => parties,
            Err(reason) => return Ok(ReconcileOutcome::Skipped(reason)),
        };

        if self.memberships.delete(&org.id, &user.id).await? {
            tracing::info!(org_id = %org.id, user_id = %user.id, "Membership deleted");
            Ok(ReconcileOutcome::Applied)
        } else {
            tracing::debug!(org_id = %org.id, user_id = %user.id, "No membership to delete");
            Ok(ReconcileOutcome::Skipped("membership not found"))
        }
    }

    async fn resolve_user(&self, external_id: &ExternalUserId) -> Result<Option<User>, DomainError> {
        self.users.find_by_external_id(external_id).await
    }

    /// Resolves both sides of a membership event. The inner `Err` carries
    /// the skip reason.
    async fn resolve_parties(
        &self,
        payload: &MembershipPayload,
    ) -> Result<Result<(Organization, User), &'static str>, DomainError> {
        let Some((org_ext, user_ext)) = payload.parties() else {
            tracing::warn!(
                external_id = ?payload.external_id,
                "Membership event missing organization or user id"
            );
            return Ok(Err("missing organization or user id"));
        };

        let Some(org) = self.find_organization(&org_ext).await? else {
            tracing::warn!(external_id = %org_ext, "Membership event for unknown organization");
            return Ok(Err("organization not found"));
        };

        let Some(user) = self.resolve_user(&user_ext).await? else {
            tracing::warn!(external_id = %user_ext, "Membership event for unknown user");
            return Ok(Err("user not found"));
        };

        Ok(Ok((org, user)))
    }

    async fn find_organization(
        &self,
        external_id: &ExternalOrgId,
    ) -> Result<Option<Organization>, DomainError> {
        self.organizations.find_by_external_id(external_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;
    use crate::domain::organization::MemberRole;
    use crate::domain::webhook::WebhookEnvelope;
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn reconciler(directory: &InMemoryDirectory) -> EventReconciler {
        EventReconciler::new(
            Arc::new(directory.clone()),
            Arc::new(directory.clone()),
            Arc::new(directory.clone()),
        )
    }

    fn event(body: serde_json::Value) -> IdentityEvent {
        let envelope = WebhookEnvelope::parse(body.to_string().as_bytes()).unwrap();
        IdentityEvent::from_envelope(&envelope)
    }

    fn user_created(id: &str, email: &str) -> IdentityEvent {
        event(json!({
            "type": "user.created",
            "data": {
                "id": id,
                "email_addresses": [{"email_address": email}],
                "first_name": "Ada",
                "last_name": "Lovelace",
                "image_url": "https://img.example.com/ada.png"
            }
        }))
    }

    fn org_created(id: &str, created_by: Option<&str>) -> IdentityEvent {
        event(json!({
            "type": "organization.created",
            "data": {"id": id, "name": "Acme", "slug": "acme", "created_by": created_by}
        }))
    }

    fn membership(kind: &str, org: &str, user: &str, role: Option<&str>) -> IdentityEvent {
        event(json!({
            "type": kind,
            "data": {
                "id": "orgmem_1",
                "organization": {"id": org},
                "public_user_data": {"user_id": user},
                "role": role
            }
        }))
    }

    async fn user(directory: &InMemoryDirectory, ext: &str) -> User {
        UserRepository::find_by_external_id(directory, &ExternalUserId::new(ext).unwrap())
            .await
            .unwrap()
            .unwrap()
    }

    async fn org(directory: &InMemoryDirectory, ext: &str) -> Organization {
        OrganizationRepository::find_by_external_id(directory, &ExternalOrgId::new(ext).unwrap())
            .await
            .unwrap()
            .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // User Events
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn user_created_provisions_user() {
        let directory = InMemoryDirectory::new();

        let outcome = reconciler(&directory)
            .reconcile(&user_created("user_1", "ada@example.com"))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Applied);
        let stored = user(&directory, "user_1").await;
        assert_eq!(stored.email, "ada@example.com");
        assert_eq!(stored.first_name, "Ada");
        assert_eq!(stored.avatar_url, "https://img.example.com/ada.png");
    }

    #[tokio::test]
    async fn user_replay_keeps_one_row_and_internal_id() {
        let directory = InMemoryDirectory::new();
        let r = reconciler(&directory);

        r.reconcile(&user_created("user_1", "ada@example.com")).await;
        let first = user(&directory, "user_1").await;
        r.reconcile(&user_created("user_1", "ada@example.com")).await;

        assert_eq!(directory.user_count().await, 1);
        assert_eq!(user(&directory, "user_1").await.id, first.id);
    }

    #[tokio::test]
    async fn user_updated_changes_email() {
        let directory = InMemoryDirectory::new();
        let r = reconciler(&directory);

        r.reconcile(&user_created("user_1", "old@example.com")).await;
        let outcome = r
            .reconcile(&event(json!({
                "type": "user.updated",
                "data": {"id": "user_1", "email_addresses": [{"email_address": "new@example.com"}]}
            })))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Applied);
        assert_eq!(user(&directory, "user_1").await.email, "new@example.com");
    }

    #[tokio::test]
    async fn user_without_email_is_skipped() {
        let directory = InMemoryDirectory::new();

        let outcome = reconciler(&directory)
            .reconcile(&event(json!({
                "type": "user.created",
                "data": {"id": "user_1", "email_addresses": []}
            })))
            .await;

        assert!(matches!(outcome, ReconcileOutcome::Skipped(_)));
        assert_eq!(directory.user_count().await, 0);
    }

    #[tokio::test]
    async fn non_object_data_is_skipped() {
        let directory = InMemoryDirectory::new();

        let outcome = reconciler(&directory)
            .reconcile(&event(json!({"type": "user.created", "data": "oops"})))
            .await;

        assert!(matches!(outcome, ReconcileOutcome::Skipped(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Organization Events
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn org_created_by_known_user_grants_owner_once() {
        let directory = InMemoryDirectory::new();
        let r = reconciler(&directory);
        r.reconcile(&user_created("user_1", "ada@example.com")).await;

        r.reconcile(&org_created("org_1", Some("user_1"))).await;
        r.reconcile(&org_created("org_1", Some("user_1"))).await;

        assert_eq!(directory.organization_count().await, 1);
        assert_eq!(directory.membership_count().await, 1);
        let org = org(&directory, "org_1").await;
        let member = directory
            .find(&org.id, &user(&directory, "user_1").await.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role, MemberRole::Owner);
    }

    #[tokio::test]
    async fn org_created_by_unknown_user_has_no_members() {
        let directory = InMemoryDirectory::new();

        let outcome = reconciler(&directory)
            .reconcile(&org_created("org_1", Some("user_ghost")))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Applied);
        assert_eq!(directory.organization_count().await, 1);
        assert_eq!(directory.membership_count().await, 0);
    }

    #[tokio::test]
    async fn org_without_slug_is_skipped() {
        let directory = InMemoryDirectory::new();

        let outcome = reconciler(&directory)
            .reconcile(&event(json!({
                "type": "organization.created",
                "data": {"id": "org_1", "name": "Acme"}
            })))
            .await;

        assert!(matches!(outcome, ReconcileOutcome::Skipped(_)));
        assert_eq!(directory.organization_count().await, 0);
    }

    #[tokio::test]
    async fn org_updated_renames_and_clears_description() {
        let directory = InMemoryDirectory::new();
        let r = reconciler(&directory);
        r.reconcile(&org_created("org_1", None)).await;

        r.reconcile(&event(json!({
            "type": "organization.updated",
            "data": {"id": "org_1", "name": "Acme Corp", "slug": "acme-corp"}
        })))
        .await;

        let org = org(&directory, "org_1").await;
        assert_eq!(org.name, "Acme Corp");
        assert_eq!(org.slug, "acme-corp");
        assert_eq!(org.description, "");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Membership Events
    // ════════════════════════════════════════════════════════════════════════════

    async fn seeded() -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        let r = reconciler(&directory);
        r.reconcile(&user_created("user_1", "ada@example.com")).await;
        r.reconcile(&org_created("org_1", None)).await;
        directory
    }

    #[tokio::test]
    async fn membership_created_with_mapped_role() {
        let directory = seeded().await;

        let outcome = reconciler(&directory)
            .reconcile(&membership(
                "organizationMembership.created",
                "org_1",
                "user_1",
                Some("admin"),
            ))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Applied);
        let org = org(&directory, "org_1").await;
        let user = user(&directory, "user_1").await;
        let stored = directory.find(&org.id, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, MemberRole::Admin);
        assert_eq!(stored.external_id.as_deref(), Some("orgmem_1"));
    }

    #[tokio::test]
    async fn membership_replay_does_not_duplicate_or_change_role() {
        let directory = seeded().await;
        let r = reconciler(&directory);

        r.reconcile(&membership("organizationMembership.created", "org_1", "user_1", Some("admin")))
            .await;
        let outcome = r
            .reconcile(&membership(
                "organizationMembership.created",
                "org_1",
                "user_1",
                Some("basic_member"),
            ))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Skipped("membership already exists"));
        assert_eq!(directory.membership_count().await, 1);
        let org = org(&directory, "org_1").await;
        let user = user(&directory, "user_1").await;
        let stored = directory.find(&org.id, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, MemberRole::Admin);
    }

    #[tokio::test]
    async fn membership_without_role_defaults_to_member() {
        let directory = seeded().await;

        reconciler(&directory)
            .reconcile(&membership("organizationMembership.created", "org_1", "user_1", None))
            .await;

        let org = org(&directory, "org_1").await;
        let user = user(&directory, "user_1").await;
        let stored = directory.find(&org.id, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, MemberRole::Member);
    }

    #[tokio::test]
    async fn membership_for_unknown_user_is_skipped() {
        let directory = seeded().await;

        let outcome = reconciler(&directory)
            .reconcile(&membership("organizationMembership.created", "org_1", "user_ghost", None))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Skipped("user not found"));
        assert_eq!(directory.membership_count().await, 0);
    }

    #[tokio::test]
    async fn membership_for_unknown_org_is_skipped() {
        let directory = seeded().await;

        let outcome = reconciler(&directory)
            .reconcile(&membership("organizationMembership.created", "org_ghost", "user_1", None))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Skipped("organization not found"));
    }

    #[tokio::test]
    async fn membership_deleted_removes_pair_then_noops() {
        let directory = seeded().await;
        let r = reconciler(&directory);
        r.reconcile(&membership("organizationMembership.created", "org_1", "user_1", None))
            .await;

        let first = r
            .reconcile(&membership("organizationMembership.deleted", "org_1", "user_1", None))
            .await;
        let second = r
            .reconcile(&membership("organizationMembership.deleted", "org_1", "user_1", None))
            .await;

        assert_eq!(first, ReconcileOutcome::Applied);
        assert_eq!(second, ReconcileOutcome::Skipped("membership not found"));
        assert_eq!(directory.membership_count().await, 0);
    }

    #[tokio::test]
    async fn membership_deleted_ignores_external_membership_id() {
        let directory = seeded().await;
        let r = reconciler(&directory);
        r.reconcile(&membership("organizationMembership.created", "org_1", "user_1", None))
            .await;

        let outcome = r
            .reconcile(&event(json!({
                "type": "organizationMembership.deleted",
                "data": {
                    "id": "orgmem_other",
                    "organization": {"id": "org_1"},
                    "public_user_data": {"user_id": "user_1"}
                }
            })))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Applied);
        assert_eq!(directory.membership_count().await, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Unknown Events and Failures
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_event_is_ignored() {
        let directory = InMemoryDirectory::new();

        let outcome = reconciler(&directory)
            .reconcile(&event(json!({"type": "session.created", "data": {}})))
            .await;

        assert_eq!(outcome, ReconcileOutcome::Ignored);
    }

    #[tokio::test]
    async fn storage_failure_is_reported_not_raised() {
        let directory = InMemoryDirectory::new();
        directory.set_unavailable(true);

        let outcome = reconciler(&directory)
            .reconcile(&user_created("user_1", "ada@example.com"))
            .await;

        assert!(outcome.is_failure());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ReconcileOutcome::Applied.to_string(), "applied");
        assert_eq!(
            ReconcileOutcome::Skipped("user not found").to_string(),
            "skipped: user not found"
        );
    }
}
