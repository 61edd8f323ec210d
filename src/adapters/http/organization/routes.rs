//! Axum router configuration for organization endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_organization, list_organizations};
use crate::adapters::http::router::AppState;

/// Organization routes, mounted under `/organizations`. All require
/// authentication.
///
/// - `GET /` - Caller's organizations, most recently joined first
/// - `GET /:id` - One organization with the caller's role
pub fn organization_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations))
        .route("/:id", get(get_organization))
}
