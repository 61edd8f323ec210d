//! Organization application handlers.
//!
//! Read-side queries for the caller's organizations, and the per-organization
//! access check used by the organization detail route.

mod check_access;
mod list_user_organizations;

pub use check_access::{CheckOrganizationAccessHandler, CheckOrganizationAccessQuery};
pub use list_user_organizations::{ListUserOrganizationsHandler, ListUserOrganizationsQuery};
