//! ListUserOrganizationsHandler - Query handler for the caller's organizations.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ExternalUserId};
use crate::domain::organization::OrganizationWithRole;
use crate::ports::{OrganizationRepository, UserRepository};

/// Query for every organization the subject belongs to.
#[derive(Debug, Clone)]
pub struct ListUserOrganizationsQuery {
    pub external_user_id: ExternalUserId,
}

/// Handler for listing organizations with the caller's role in each.
pub struct ListUserOrganizationsHandler {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl ListUserOrganizationsHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            users,
            organizations,
        }
    }

    /// Returns `None` if the subject is not provisioned, otherwise the
    /// memberships ordered most-recently-joined first.
    pub async fn handle(
        &self,
        query: ListUserOrganizationsQuery,
    ) -> Result<Option<Vec<OrganizationWithRole>>, DomainError> {
        let Some(user) = self.users.find_by_external_id(&query.external_user_id).await? else {
            return Ok(None);
        };

        let organizations = self.organizations.list_for_user(&user.id).await?;
        Ok(Some(organizations))
    }
}
