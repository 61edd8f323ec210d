//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session token validators (Clerk, mock)
//! - `http` - axum REST API and webhook endpoint
//! - `memory` - In-memory persistence for tests and local runs
//! - `postgres` - PostgreSQL persistence via sqlx

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
