//! HTTP handler for Clerk webhook deliveries.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::router::AppState;
use crate::application::handlers::webhook::HandleIdentityWebhookCommand;
use crate::domain::webhook::WebhookError;

const SVIX_ID: &str = "svix-id";
const SVIX_TIMESTAMP: &str = "svix-timestamp";
const SVIX_SIGNATURE: &str = "svix-signature";

/// POST /api/v1/webhooks/clerk - Handle identity provider events
///
/// Answers 200 with an empty body once the delivery is verified and parsed,
/// even if applying it failed, so the provider does not redeliver.
pub async fn handle_clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookApiError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let cmd = HandleIdentityWebhookCommand {
        payload: body.to_vec(),
        svix_id: header(SVIX_ID),
        svix_timestamp: header(SVIX_TIMESTAMP),
        svix_signature: header(SVIX_SIGNATURE),
    };

    state.webhook_handler().handle(cmd).await?;

    Ok(StatusCode::OK)
}

/// API error type for webhook rejections.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let message = match &self.0 {
            WebhookError::VerifierUnavailable(_) => "Webhook verification unavailable".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse::new(self.0.code(), message);
        (self.0.status_code(), Json(body)).into_response()
    }
}
