//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresUserRepository` - users keyed by provider id
//! - `PostgresOrganizationRepository` - organizations and the owner grant
//! - `PostgresMembershipRepository` - organization memberships
//! - `connect` / `run_migrations` - pool construction from `DatabaseConfig`

mod membership_repository;
mod organization_repository;
mod pool;
mod user_repository;

pub use membership_repository::PostgresMembershipRepository;
pub use organization_repository::PostgresOrganizationRepository;
pub use pool::{connect, run_migrations};
pub use user_repository::PostgresUserRepository;

use crate::domain::foundation::DomainError;

/// Wraps a sqlx error with the operation that failed.
fn db_error(operation: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", operation, err))
}
