//! PostgreSQL implementation of ChallengeRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use nb_core::domain::entities::VerificationChallenge;
use nb_core::errors::DomainError;
use nb_core::repositories::ChallengeRepository;

use super::{column, query_failed};

pub struct PgChallengeRepository {
    pool: PgPool,
}

impl PgChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChallengeRepository for PgChallengeRepository {
    async fn store(
        &self,
        user_id: Uuid,
        challenge: VerificationChallenge,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO verification_challenges (user_id, code, phone, expires_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 code = EXCLUDED.code, \
                 phone = EXCLUDED.phone, \
                 expires_at = EXCLUDED.expires_at, \
                 created_at = NOW()",
        )
        .bind(user_id)
        .bind(&challenge.code)
        .bind(&challenge.phone)
        .bind(challenge.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("store verification challenge", e))?;

        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationChallenge>, DomainError> {
        let row = sqlx::query(
            "SELECT code, phone, expires_at FROM verification_challenges WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("find verification challenge", e))?;

        row.map(|row| -> Result<VerificationChallenge, DomainError> {
            Ok(VerificationChallenge {
                code: column(&row, "code")?,
                expires_at: column(&row, "expires_at")?,
                phone: column(&row, "phone")?,
            })
        })
        .transpose()
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM verification_challenges WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("clear verification challenge", e))?;

        Ok(())
    }
}
