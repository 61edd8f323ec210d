//! GetCurrentUserHandler - Query handler for the caller's own user record.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ExternalUserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

/// Query for the user behind an authenticated subject.
#[derive(Debug, Clone)]
pub struct GetCurrentUserQuery {
    pub external_user_id: ExternalUserId,
}

/// Handler for resolving the current user.
///
/// Returns `None` when the subject has a valid token but no webhook has
/// provisioned the user yet.
pub struct GetCurrentUserHandler {
    users: Arc<dyn UserRepository>,
}

impl GetCurrentUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, query: GetCurrentUserQuery) -> Result<Option<User>, DomainError> {
        self.users.find_by_external_id(&query.external_user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDirectory;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::user::UserProfile;

    fn ext(id: &str) -> ExternalUserId {
        ExternalUserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn returns_provisioned_user() {
        let directory = InMemoryDirectory::new();
        directory
            .upsert(UserProfile::new(ext("user_1"), "ada@example.com"))
            .await
            .unwrap();
        let handler = GetCurrentUserHandler::new(Arc::new(directory));

        let user = handler
            .handle(GetCurrentUserQuery {
                external_user_id: ext("user_1"),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn returns_none_for_unprovisioned_subject() {
        let handler = GetCurrentUserHandler::new(Arc::new(InMemoryDirectory::new()));

        let result = handler
            .handle(GetCurrentUserQuery {
                external_user_id: ext("user_missing"),
            })
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn propagates_storage_failure() {
        let directory = InMemoryDirectory::new();
        directory.set_unavailable(true);
        let handler = GetCurrentUserHandler::new(Arc::new(directory));

        let err = handler
            .handle(GetCurrentUserQuery {
                external_user_id: ext("user_1"),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
