//! PostgreSQL implementation of OrganizationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::db_error;
use crate::domain::foundation::{
    DomainError, ErrorCode, ExternalOrgId, OrganizationId, Timestamp, UserId,
};
use crate::domain::organization::{
    MemberRole, Organization, OrganizationProfile, OrganizationWithRole,
};
use crate::ports::OrganizationRepository;

/// PostgreSQL implementation of the OrganizationRepository port.
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an organization.
#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: Uuid,
    external_id: String,
    name: String,
    slug: String,
    description: String,
    logo_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = DomainError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Organization {
            id: OrganizationId::from_uuid(row.id),
            external_id: ExternalOrgId::new(row.external_id)?,
            name: row.name,
            slug: row.slug,
            description: row.description,
            logo_url: row.logo_url,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// An organization joined with the caller's membership.
#[derive(Debug, sqlx::FromRow)]
struct OrganizationWithRoleRow {
    #[sqlx(flatten)]
    organization: OrganizationRow,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<OrganizationWithRoleRow> for OrganizationWithRole {
    type Error = DomainError;

    fn try_from(row: OrganizationWithRoleRow) -> Result<Self, Self::Error> {
        Ok(OrganizationWithRole {
            organization: Organization::try_from(row.organization)?,
            role: parse_role(&row.role)?,
            joined_at: Timestamp::from_datetime(row.joined_at),
        })
    }
}

pub(super) fn parse_role(s: &str) -> Result<MemberRole, DomainError> {
    s.parse::<MemberRole>().map_err(|_| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid role value: {}", s))
    })
}

const UPSERT_ORGANIZATION: &str = r#"
    INSERT INTO organizations (id, external_id, name, slug, description, logo_url)
    VALUES ($1, $2, $3, $4, '', $5)
    ON CONFLICT (external_id) DO UPDATE SET
        name = EXCLUDED.name,
        slug = EXCLUDED.slug,
        description = EXCLUDED.description,
        logo_url = EXCLUDED.logo_url,
        updated_at = NOW()
    RETURNING id, external_id, name, slug, description, logo_url, created_at, updated_at
"#;

const ORGANIZATION_COLUMNS: &str =
    "id, external_id, name, slug, description, logo_url, created_at, updated_at";

impl PostgresOrganizationRepository {
    async fn upsert_in(
        tx: &mut Transaction<'_, Postgres>,
        profile: &OrganizationProfile,
    ) -> Result<OrganizationRow, DomainError> {
        sqlx::query_as(UPSERT_ORGANIZATION)
            .bind(Uuid::new_v4())
            .bind(profile.external_id.as_str())
            .bind(&profile.name)
            .bind(&profile.slug)
            .bind(&profile.logo_url)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| db_error("upsert organization", e))
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn upsert_with_owner(
        &self,
        profile: OrganizationProfile,
        owner: Option<UserId>,
    ) -> Result<Organization, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let row = Self::upsert_in(&mut tx, &profile).await?;

        if let Some(owner) = owner {
            sqlx::query(
                r#"
                INSERT INTO organization_members (id, organization_id, user_id, role)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (organization_id, user_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(row.id)
            .bind(owner.as_uuid())
            .bind(MemberRole::Owner.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("grant owner membership", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit organization upsert", e))?;

        Organization::try_from(row)
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalOrgId,
    ) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM organizations WHERE external_id = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(external_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find organization", e))?;

        row.map(Organization::try_from).transpose()
    }

    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        let row: Option<OrganizationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM organizations WHERE id = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find organization", e))?;

        row.map(Organization::try_from).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OrganizationWithRole>, DomainError> {
        let rows: Vec<OrganizationWithRoleRow> = sqlx::query_as(
            r#"
            SELECT o.id, o.external_id, o.name, o.slug, o.description, o.logo_url,
                   o.created_at, o.updated_at, om.role, om.joined_at
            FROM organizations o
            INNER JOIN organization_members om ON om.organization_id = o.id
            WHERE om.user_id = $1
            ORDER BY om.joined_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list organizations", e))?;

        rows.into_iter().map(OrganizationWithRole::try_from).collect()
    }
}
