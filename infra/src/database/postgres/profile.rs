//! PostgreSQL implementation of ProfileRepository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use nb_core::domain::entities::{Profile, Role};
use nb_core::errors::DomainError;
use nb_core::repositories::ProfileRepository;

use super::{column, parsed_column, query_failed};

const PROFILE_COLUMNS: &str = "id, email, phone_e164, phone_verified, role";

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: &PgRow) -> Result<Profile, DomainError> {
        Ok(Profile {
            id: column(row, "id")?,
            email: column(row, "email")?,
            phone_e164: column(row, "phone_e164")?,
            phone_verified: column(row, "phone_verified")?,
            role: parsed_column(row, "role")?,
        })
    }

    fn rows_to_profiles(rows: Vec<PgRow>) -> Result<Vec<Profile>, DomainError> {
        rows.iter().map(Self::row_to_profile).collect()
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find profile", e))?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Profile>, DomainError> {
        let query = format!("SELECT {} FROM profiles ORDER BY created_at, id", PROFILE_COLUMNS);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list profiles", e))?;

        Self::rows_to_profiles(rows)
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, DomainError> {
        let query = format!(
            "SELECT {} FROM profiles WHERE role = $1 ORDER BY created_at, id",
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list profiles by role", e))?;

        Self::rows_to_profiles(rows)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {} FROM profiles WHERE id = ANY($1) ORDER BY created_at, id",
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list profiles by id", e))?;

        Self::rows_to_profiles(rows)
    }

    async fn save(&self, profile: Profile) -> Result<Profile, DomainError> {
        sqlx::query(
            "INSERT INTO profiles (id, email, phone_e164, phone_verified, role) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET \
                 email = EXCLUDED.email, \
                 phone_e164 = EXCLUDED.phone_e164, \
                 phone_verified = EXCLUDED.phone_verified, \
                 role = EXCLUDED.role, \
                 updated_at = NOW()",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.phone_e164)
        .bind(profile.phone_verified)
        .bind(profile.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("save profile", e))?;

        Ok(profile)
    }

    async fn mark_phone_verified(&self, id: Uuid, phone_e164: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE profiles SET phone_e164 = $2, phone_verified = TRUE, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(phone_e164)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("mark phone verified", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Profile"));
        }
        Ok(())
    }
}
