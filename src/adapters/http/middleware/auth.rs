//! Authentication middleware and extractor for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that requires a valid Bearer token and injects
//!   the `AuthenticatedSubject` into request extensions
//! - `RequireAuth` - Extractor that reads the subject back out
//!
//! The middleware uses the `SessionValidator` port, so it does not care
//! whether tokens are verified by Clerk or by a mock in tests.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedSubject into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{AuthError, AuthenticatedSubject, ErrorCode};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Extracts the token from an `Authorization` header value.
///
/// The value must split on single spaces into exactly two parts, the first
/// being `Bearer`. Anything else (including an empty token) is malformed.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Authentication middleware for protected routes.
///
/// Rejects with 401 when the header is missing, malformed, or carries a token
/// the validator refuses. The validator is never called for a bad header.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader),
        None => Err(AuthError::MissingHeader),
    };

    let subject = match header.and_then(parse_bearer) {
        Ok(token) => validator.validate(token).await,
        Err(e) => Err(e),
    };

    match subject {
        Ok(subject) => {
            request.extensions_mut().insert(subject);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, path = %request.uri().path(), "Authentication rejected");
            unauthorized(&e)
        }
    }
}

fn unauthorized(err: &AuthError) -> Response {
    let body = ErrorResponse::new(ErrorCode::Unauthorized.to_string(), err.to_string());
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Extractor that requires authentication.
///
/// Only succeeds behind `auth_middleware`; anywhere else it rejects with 401.
///
/// ```ignore
/// async fn my_handler(RequireAuth(subject): RequireAuth) -> impl IntoResponse {
///     subject.external_user_id.to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedSubject);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubject>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No subject was injected for this request.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => unauthorized(&AuthError::MissingHeader),
        }
    }
}
