//! Data Transfer Objects for organization endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::organization::{MemberRole, Organization, OrganizationAccess, OrganizationWithRole};

/// An organization as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationResponse {
    pub id: String,
    pub clerk_org_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id.to_string(),
            clerk_org_id: org.external_id.to_string(),
            name: org.name,
            slug: org.slug,
            description: org.description,
            logo_url: org.logo_url,
            created_at: *org.created_at.as_datetime(),
            updated_at: *org.updated_at.as_datetime(),
        }
    }
}

/// List entry: the organization's fields plus the caller's `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationWithRoleResponse {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub role: MemberRole,
}

impl From<OrganizationWithRole> for OrganizationWithRoleResponse {
    fn from(entry: OrganizationWithRole) -> Self {
        Self {
            organization: entry.organization.into(),
            role: entry.role,
        }
    }
}

/// Detail view: `{"organization": {...}, "role": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAccessResponse {
    pub organization: OrganizationResponse,
    pub role: MemberRole,
}

impl From<OrganizationAccess> for OrganizationAccessResponse {
    fn from(access: OrganizationAccess) -> Self {
        Self {
            organization: access.organization.into(),
            role: access.role,
        }
    }
}
