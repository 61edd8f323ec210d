//! PostgreSQL implementation of MembershipRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use super::organization_repository::parse_role;
use crate::domain::foundation::{DomainError, MembershipId, OrganizationId, Timestamp, UserId};
use crate::domain::organization::{Membership, NewMembership};
use crate::ports::MembershipRepository;

/// PostgreSQL implementation of the MembershipRepository port.
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a membership.
#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    organization_id: Uuid,
    user_id: Uuid,
    role: String,
    external_id: Option<String>,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: MembershipId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            user_id: UserId::from_uuid(row.user_id),
            role: parse_role(&row.role)?,
            external_id: row.external_id,
            joined_at: Timestamp::from_datetime(row.joined_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn create_if_absent(&self, membership: NewMembership) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO organization_members (id, organization_id, user_id, role, external_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (organization_id, user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(membership.organization_id.as_uuid())
        .bind(membership.user_id.as_uuid())
        .bind(membership.role.as_str())
        .bind(&membership.external_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("create membership", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, organization_id, user_id, role, external_id, joined_at, updated_at
            FROM organization_members
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn delete(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("delete membership", e))?;

        Ok(result.rows_affected() > 0)
    }
}
