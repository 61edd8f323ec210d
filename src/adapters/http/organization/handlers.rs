//! HTTP handlers for organization endpoints.

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::response::DataResponse;
use crate::adapters::http::router::AppState;
use crate::application::handlers::organization::{
    CheckOrganizationAccessQuery, ListUserOrganizationsQuery,
};
use crate::domain::foundation::{ErrorCode, OrganizationId};

use super::dto::{OrganizationAccessResponse, OrganizationWithRoleResponse};

/// GET /api/v1/organizations - Organizations the caller belongs to
pub async fn list_organizations(
    State(state): State<AppState>,
    RequireAuth(subject): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let organizations = state
        .list_user_organizations_handler()
        .handle(ListUserOrganizationsQuery {
            external_user_id: subject.external_user_id,
        })
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "User not found"))?;

    let body: Vec<OrganizationWithRoleResponse> =
        organizations.into_iter().map(Into::into).collect();
    Ok(Json(DataResponse::new(body)))
}

/// GET /api/v1/organizations/:id - One organization, members only
pub async fn get_organization(
    State(state): State<AppState>,
    RequireAuth(subject): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let organization_id: OrganizationId = id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid organization ID"))?;

    let access = state
        .check_organization_access_handler()
        .handle(CheckOrganizationAccessQuery {
            external_user_id: subject.external_user_id,
            organization_id,
        })
        .await?;

    Ok(Json(DataResponse::new(OrganizationAccessResponse::from(access))))
}
