//! Webhook error types.
//!
//! Everything here is a transport-level rejection. Once a delivery is verified
//! and its envelope parsed, reconciliation problems are logged and the
//! delivery is acknowledged, so they never become a `WebhookError`.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that reject an inbound webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// One of `svix-id`, `svix-timestamp`, `svix-signature` is absent or empty.
    #[error("Missing webhook headers")]
    MissingHeaders,

    /// No `v1` signature matched the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// `svix-timestamp` is not an integer.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// `svix-timestamp` is outside the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// The signing secret could not be turned into a key.
    #[error("Webhook verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// Verified body is not a JSON object.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    /// Verified body has no string `type` field.
    #[error("Missing event type")]
    MissingEventType,
}

impl WebhookError {
    /// Maps the error to the HTTP status returned to the sender.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingHeaders
            | WebhookError::InvalidJson(_)
            | WebhookError::MissingEventType => StatusCode::BAD_REQUEST,

            WebhookError::InvalidSignature
            | WebhookError::InvalidTimestamp
            | WebhookError::TimestampOutOfRange => StatusCode::UNAUTHORIZED,

            WebhookError::VerifierUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::MissingHeaders => "MISSING_HEADERS",
            WebhookError::InvalidSignature
            | WebhookError::InvalidTimestamp
            | WebhookError::TimestampOutOfRange => "INVALID_SIGNATURE",
            WebhookError::VerifierUnavailable(_) => "VERIFIER_UNAVAILABLE",
            WebhookError::InvalidJson(_) => "INVALID_JSON",
            WebhookError::MissingEventType => "MISSING_EVENT_TYPE",
        }
    }
}
