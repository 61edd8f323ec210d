//! HTTP adapters - REST API implementations.
//!
//! Each resource has its own module with dto, handlers, and routes.
//! `router` assembles them under `/api/v1` with the shared `AppState`.

pub mod error;
pub mod middleware;
pub mod organization;
pub mod response;
pub mod router;
pub mod user;
pub mod webhook;

pub use error::{ApiError, ErrorResponse};
pub use response::DataResponse;
pub use router::{api_router, app_router, cors_layer, AppState};
