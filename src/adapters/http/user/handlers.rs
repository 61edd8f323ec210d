//! HTTP handlers for user endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::response::DataResponse;
use crate::adapters::http::router::AppState;
use crate::application::handlers::user::GetCurrentUserQuery;
use crate::domain::foundation::ErrorCode;

use super::dto::UserResponse;

/// GET /api/v1/users/me - The caller's provisioned user record
pub async fn get_current_user(
    State(state): State<AppState>,
    RequireAuth(subject): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .get_current_user_handler()
        .handle(GetCurrentUserQuery {
            external_user_id: subject.external_user_id,
        })
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "User not found"))?;

    Ok(Json(DataResponse::new(UserResponse::from(user))))
}
