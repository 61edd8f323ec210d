//! Application router and shared state.
//!
//! ```text
//! /api/v1/health                 public
//! /api/v1/webhooks/clerk         signature-verified
//! /api/v1/users/me               bearer auth
//! /api/v1/organizations[/:id]    bearer auth
//! ```

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::handlers::organization::{
    CheckOrganizationAccessHandler, ListUserOrganizationsHandler,
};
use crate::application::handlers::user::GetCurrentUserHandler;
use crate::application::handlers::webhook::{EventReconciler, HandleIdentityWebhookHandler};
use crate::config::{ServerConfig, WebhookConfig};
use crate::ports::{MembershipRepository, OrganizationRepository, SessionValidator, UserRepository};

use super::middleware::auth_middleware;
use super::organization::organization_routes;
use super::user::user_routes;
use super::webhook::webhook_routes;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub webhook: WebhookConfig,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        memberships: Arc<dyn MembershipRepository>,
        session_validator: Arc<dyn SessionValidator>,
        webhook: WebhookConfig,
    ) -> Self {
        Self {
            users,
            organizations,
            memberships,
            session_validator,
            webhook,
        }
    }

    /// Create handlers on demand from the shared state.
    pub fn get_current_user_handler(&self) -> GetCurrentUserHandler {
        GetCurrentUserHandler::new(self.users.clone())
    }

    pub fn list_user_organizations_handler(&self) -> ListUserOrganizationsHandler {
        ListUserOrganizationsHandler::new(self.users.clone(), self.organizations.clone())
    }

    pub fn check_organization_access_handler(&self) -> CheckOrganizationAccessHandler {
        CheckOrganizationAccessHandler::new(
            self.users.clone(),
            self.memberships.clone(),
            self.organizations.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleIdentityWebhookHandler {
        let reconciler = EventReconciler::new(
            self.users.clone(),
            self.organizations.clone(),
            self.memberships.clone(),
        );
        HandleIdentityWebhookHandler::new(self.webhook.signing_secret.clone(), Arc::new(reconciler))
            .with_tolerance(self.webhook.tolerance_secs)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Routers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/v1/health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// The `/api/v1` routes with state applied, without cross-cutting layers.
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/users", user_routes())
        .nest("/organizations", organization_routes())
        .route_layer(middleware::from_fn_with_state(
            state.session_validator.clone(),
            auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .nest("/webhooks", webhook_routes());

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .with_state(state)
}

/// The full application: API routes plus request id, tracing, CORS, and
/// timeout layers.
pub fn app_router(state: AppState, server: &ServerConfig) -> Router {
    api_router(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// CORS for the configured origins, with credentials.
///
/// Wildcard and unparseable origins are dropped: credentials cannot be
/// combined with `*`.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::memory::InMemoryDirectory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        let directory = InMemoryDirectory::new();
        AppState::new(
            Arc::new(directory.clone()),
            Arc::new(directory.clone()),
            Arc::new(directory),
            Arc::new(MockSessionValidator::new()),
            WebhookConfig::new("whsec_dGVzdC1zaWduaW5nLWtleQ=="),
        )
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app_router(state(), &ServerConfig::default());

        let response = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn protected_routes_require_auth() {
        for uri in ["/api/v1/users/me", "/api/v1/organizations"] {
            let response = api_router(state())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let app = app_router(state(), &ServerConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/users/me")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:3000"))
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some(&HeaderValue::from_static("true"))
        );
    }

    #[test]
    fn cors_layer_drops_wildcard() {
        let _app: Router = Router::new()
            .route("/", get(health))
            .layer(cors_layer(&["*".to_string(), "https://app.example.com".to_string()]));
    }
}
