//! Organization entity.

use crate::domain::foundation::{ExternalOrgId, OrganizationId, Timestamp};
use serde::{Deserialize, Serialize};

/// Organization fields delivered by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationProfile {
    pub external_id: ExternalOrgId,
    pub name: String,
    pub slug: String,
    pub logo_url: String,
}

impl OrganizationProfile {
    pub fn new(
        external_id: ExternalOrgId,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            external_id,
            name: name.into(),
            slug: slug.into(),
            logo_url: String::new(),
        }
    }

    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = url.into();
        self
    }
}

/// A synced organization.
///
/// `description` is never populated by the provider and stays empty unless
/// written by some other path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub external_id: ExternalOrgId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Organization {
    /// Creates a new organization from a provider profile.
    pub fn provision(profile: OrganizationProfile) -> Self {
        let now = Timestamp::now();
        Self {
            id: OrganizationId::new(),
            external_id: profile.external_id,
            name: profile.name,
            slug: profile.slug,
            description: String::new(),
            logo_url: profile.logo_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites name, slug, and logo. Description is reset to empty, matching
    /// what an upsert from the provider writes.
    pub fn apply_profile(&mut self, profile: OrganizationProfile) {
        self.name = profile.name;
        self.slug = profile.slug;
        self.description = String::new();
        self.logo_url = profile.logo_url;
        self.updated_at = Timestamp::now();
    }
}
