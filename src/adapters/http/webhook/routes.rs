//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::handle_clerk_webhook;
use crate::adapters::http::router::AppState;

/// Webhook routes, mounted under `/webhooks`.
///
/// These are not behind bearer auth; deliveries are verified by signature.
///
/// - `POST /clerk` - Clerk (Svix) events
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/clerk", post(handle_clerk_webhook))
}
