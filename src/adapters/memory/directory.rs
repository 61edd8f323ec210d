//! In-memory user/organization/membership directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ExternalOrgId, ExternalUserId, OrganizationId, UserId,
};
use crate::domain::organization::{
    MemberRole, Membership, NewMembership, Organization, OrganizationProfile, OrganizationWithRole,
};
use crate::domain::user::{User, UserProfile};
use crate::ports::{MembershipRepository, OrganizationRepository, UserRepository};

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    organizations: HashMap<OrganizationId, Organization>,
    /// Insertion order doubles as the tie-breaker for equal `joined_at`.
    memberships: Vec<Membership>,
}

impl DirectoryState {
    fn insert_membership_if_absent(&mut self, request: NewMembership) -> bool {
        let exists = self
            .memberships
            .iter()
            .any(|m| m.links(&request.organization_id, &request.user_id));
        if exists {
            return false;
        }
        self.memberships.push(Membership::join(request));
        true
    }

    fn upsert_organization(&mut self, profile: OrganizationProfile) -> Organization {
        let existing = self
            .organizations
            .values_mut()
            .find(|o| o.external_id == profile.external_id);

        match existing {
            Some(org) => {
                org.apply_profile(profile);
                org.clone()
            }
            None => {
                let org = Organization::provision(profile);
                self.organizations.insert(org.id, org.clone());
                org
            }
        }
    }
}

/// In-memory implementation of all persistence ports.
///
/// Every operation runs under a single write or read lock, so concurrent
/// upserts of the same key converge the same way the SQL statements do.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `DatabaseError` (or
    /// succeed again when `false`). Simulates an outage in tests.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn organization_count(&self) -> usize {
        self.state.read().await.organizations.len()
    }

    pub async fn membership_count(&self) -> usize {
        self.state.read().await.memberships.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("In-memory directory is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryDirectory {
    async fn upsert(&self, profile: UserProfile) -> Result<User, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let existing = state
            .users
            .values_mut()
            .find(|u| u.external_id == profile.external_id);

        match existing {
            Some(user) => {
                user.apply_profile(profile);
                Ok(user.clone())
            }
            None => {
                let user = User::provision(profile);
                state.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| &u.external_id == external_id)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        Ok(self.state.read().await.users.get(id).cloned())
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryDirectory {
    async fn upsert_with_owner(
        &self,
        profile: OrganizationProfile,
        owner: Option<UserId>,
    ) -> Result<Organization, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let org = state.upsert_organization(profile);
        if let Some(owner) = owner {
            state.insert_membership_if_absent(NewMembership::new(org.id, owner, MemberRole::Owner));
        }
        Ok(org)
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalOrgId,
    ) -> Result<Option<Organization>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .organizations
            .values()
            .find(|o| &o.external_id == external_id)
            .cloned())
    }

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        self.check_available()?;
        Ok(self.state.read().await.organizations.get(id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OrganizationWithRole>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;

        let mut listed: Vec<OrganizationWithRole> = state
            .memberships
            .iter()
            .rev()
            .filter(|m| &m.user_id == user_id)
            .filter_map(|m| {
                state
                    .organizations
                    .get(&m.organization_id)
                    .map(|org| OrganizationWithRole {
                        organization: org.clone(),
                        role: m.role,
                        joined_at: m.joined_at,
                    })
            })
            .collect();

        // Stable sort keeps newest-inserted first among equal timestamps.
        listed.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(listed)
    }
}

#[async_trait]
impl MembershipRepository for InMemoryDirectory {
    async fn create_if_absent(&self, membership: NewMembership) -> Result<bool, DomainError> {
        self.check_available()?;
        Ok(self
            .state
            .write()
            .await
            .insert_membership_if_absent(membership))
    }

    async fn find(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .find(|m| m.links(organization_id, user_id))
            .cloned())
    }

    async fn delete(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|m| !m.links(organization_id, user_id));
        Ok(state.memberships.len() < before)
    }
}
