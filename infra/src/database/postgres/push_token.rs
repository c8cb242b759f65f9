//! PostgreSQL implementation of PushTokenRepository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use nb_core::domain::entities::PushToken;
use nb_core::errors::DomainError;
use nb_core::repositories::PushTokenRepository;

use super::{column, query_failed};

pub struct PgPushTokenRepository {
    pool: PgPool,
}

impl PgPushTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &PgRow) -> Result<PushToken, DomainError> {
        Ok(PushToken {
            id: column(row, "id")?,
            user_id: column(row, "user_id")?,
            token: column(row, "token")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl PushTokenRepository for PgPushTokenRepository {
    async fn insert_if_absent(&self, token: PushToken) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO fcm_tokens (id, user_id, token, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, token) DO NOTHING",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("register push token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<PushToken>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, user_id, token, created_at FROM fcm_tokens \
             WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list push tokens", e))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn delete_by_token(&self, token: &str) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM fcm_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete push token", e))?;

        let removed = result.rows_affected();
        if removed > 0 {
            info!(removed, "Deleted push token rows");
        }
        Ok(removed)
    }
}
