//! Membership roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Role of a user within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Granted only to an organization's creator.
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    /// Maps a provider role string onto a local role.
    ///
    /// Only an exact `"admin"` becomes Admin. Everything else, including an
    /// absent role, becomes Member. Owner is never produced here.
    pub fn from_external(role: Option<&str>) -> Self {
        match role {
            Some("admin") => MemberRole::Admin,
            Some("basic_member") => MemberRole::Member,
            _ => MemberRole::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = ValidationError;

    /// Parses the stored (lowercase) form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}
