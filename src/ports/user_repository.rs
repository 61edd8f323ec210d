//! User repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ExternalUserId, UserId};
use crate::domain::user::{User, UserProfile};

/// Repository port for users.
///
/// Implementations must keep `external_id` unique and must make `upsert`
/// atomic, so concurrent deliveries of the same event converge on one row.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user or overwrites the profile fields of the existing one
    /// with the same external id. Returns the stored row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(&self, profile: UserProfile) -> Result<User, DomainError>;

    /// Find a user by the provider's id. Returns `None` if not provisioned.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> Result<Option<User>, DomainError>;

    /// Find a user by internal id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;
}
