//! HTTP adapter for identity provider webhooks.

mod handlers;
mod routes;

pub use handlers::{handle_clerk_webhook, WebhookApiError};
pub use routes::webhook_routes;
