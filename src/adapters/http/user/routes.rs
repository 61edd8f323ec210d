//! Axum router configuration for user endpoints.

use axum::{routing::get, Router};

use super::handlers::get_current_user;
use crate::adapters::http::router::AppState;

/// User routes, mounted under `/users`. All require authentication.
///
/// - `GET /me` - Current user
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}
