//! User aggregate and its upsert input.

use crate::domain::foundation::{ExternalUserId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Profile fields delivered by the identity provider.
///
/// This is the full replacement set for an upsert: every field overwrites the
/// stored value, absent optional fields become empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub external_id: ExternalUserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: String,
}

impl UserProfile {
    /// Creates a profile with only the required fields set.
    pub fn new(external_id: ExternalUserId, email: impl Into<String>) -> Self {
        Self {
            external_id,
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            avatar_url: String::new(),
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = url.into();
        self
    }
}

/// A provisioned user.
///
/// # Invariants
///
/// - `id` is stable across upserts of the same `external_id`
/// - `external_id` is unique and never changes once stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalUserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Provisions a new user from a provider profile.
    pub fn provision(profile: UserProfile) -> Self {
        let now = Timestamp::now();
        Self {
            id: UserId::new(),
            external_id: profile.external_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            avatar_url: profile.avatar_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the mutable profile fields, keeping identity and `created_at`.
    pub fn apply_profile(&mut self, profile: UserProfile) {
        self.email = profile.email;
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
        self.avatar_url = profile.avatar_url;
        self.updated_at = Timestamp::now();
    }
}
