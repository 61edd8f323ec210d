//! HTTP adapter for user endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::UserResponse;
pub use handlers::get_current_user;
pub use routes::user_routes;
