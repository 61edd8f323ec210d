//! HTTP error responses.
//!
//! Every error body has the shape `{"error_code": "...", "message": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::organization::AccessError;

/// Standard error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidFormat, message)
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match err.code {
            ErrorCode::ValidationFailed | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
            ErrorCode::UserNotFound
            | ErrorCode::OrganizationNotFound
            | ErrorCode::MembershipNotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                tracing::error!(error = %err, "Request failed");
                return Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "Internal server error",
                );
            }
        };
        Self::new(status, err.code, err.message)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => {
                Self::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, err.to_string())
            }
            AccessError::Forbidden => {
                Self::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, err.to_string())
            }
            AccessError::NotFound => {
                Self::not_found(ErrorCode::OrganizationNotFound, err.to_string())
            }
            AccessError::Infrastructure(e) => Self::from(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code.to_string(), self.message);
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_hide_details() {
        let err = ApiError::from(DomainError::database("connection refused on 10.0.0.5"));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ApiError::from(DomainError::new(ErrorCode::ValidationFailed, "bad"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn access_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AccessError::Unauthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::from(AccessError::Forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(AccessError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(AccessError::Infrastructure(DomainError::database("down"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_response_serializes_code_and_message() {
        let json = serde_json::to_value(ErrorResponse::new("FORBIDDEN", "Access denied")).unwrap();
        assert_eq!(json, serde_json::json!({"error_code": "FORBIDDEN", "message": "Access denied"}));
    }
}
