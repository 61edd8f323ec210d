//! HTTP adapter for organization endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{OrganizationAccessResponse, OrganizationResponse, OrganizationWithRoleResponse};
pub use handlers::{get_organization, list_organizations};
pub use routes::organization_routes;
