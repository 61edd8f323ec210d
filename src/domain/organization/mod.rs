//! Organization domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Organization entity and its upsert input
//! - `role` - MemberRole and the provider role mapping
//! - `membership` - Links between users and organizations
//! - `access` - Outcome of the per-organization authorization check

mod access;
mod aggregate;
mod membership;
mod role;

pub use access::{AccessError, OrganizationAccess};
pub use aggregate::{Organization, OrganizationProfile};
pub use membership::{Membership, NewMembership, OrganizationWithRole};
pub use role::MemberRole;
