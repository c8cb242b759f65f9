//! PostgreSQL implementation of RecipientRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use nb_core::domain::entities::{Recipient, RecipientStatus};
use nb_core::errors::DomainError;
use nb_core::repositories::RecipientRepository;

use super::{channel_names, channels_column, column, is_unique_violation, parsed_column, query_failed};

const RECIPIENT_COLUMNS: &str =
    "id, message_id, user_id, channels_attempted, status, read_at, created_at, updated_at";

pub struct PgRecipientRepository {
    pool: PgPool,
}

impl PgRecipientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_recipient(row: &PgRow) -> Result<Recipient, DomainError> {
        Ok(Recipient {
            id: column(row, "id")?,
            message_id: column(row, "message_id")?,
            user_id: column(row, "user_id")?,
            channels_attempted: channels_column(row, "channels_attempted")?,
            status: parsed_column(row, "status")?,
            read_at: column(row, "read_at")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl RecipientRepository for PgRecipientRepository {
    async fn insert_many(&self, recipients: Vec<Recipient>) -> Result<(), DomainError> {
        let query = format!(
            "INSERT INTO message_recipients ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            RECIPIENT_COLUMNS
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_failed("begin recipient insert", e))?;

        for recipient in &recipients {
            sqlx::query(&query)
                .bind(recipient.id)
                .bind(recipient.message_id)
                .bind(recipient.user_id)
                .bind(channel_names(&recipient.channels_attempted))
                .bind(recipient.status.as_str())
                .bind(recipient.read_at)
                .bind(recipient.created_at)
                .bind(recipient.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        DomainError::validation("Recipient already exists for this message")
                    } else {
                        query_failed("insert recipient", e)
                    }
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| query_failed("commit recipient insert", e))?;

        debug!(count = recipients.len(), "Inserted recipients");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipient>, DomainError> {
        let query = format!(
            "SELECT {} FROM message_recipients WHERE id = $1",
            RECIPIENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find recipient", e))?;

        row.as_ref().map(Self::row_to_recipient).transpose()
    }

    async fn find_by_message(&self, message_id: Uuid) -> Result<Vec<Recipient>, DomainError> {
        let query = format!(
            "SELECT {} FROM message_recipients WHERE message_id = $1 ORDER BY created_at, id",
            RECIPIENT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(message_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list recipients", e))?;

        rows.iter().map(Self::row_to_recipient).collect()
    }

    async fn find_for_user(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Recipient>, DomainError> {
        let query = format!(
            "SELECT {} FROM message_recipients WHERE message_id = $1 AND user_id = $2",
            RECIPIENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(message_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find recipient for user", e))?;

        row.as_ref().map(Self::row_to_recipient).transpose()
    }

    async fn update_status(&self, id: Uuid, status: RecipientStatus) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE message_recipients SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("update recipient status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Recipient"));
        }
        Ok(())
    }

    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Recipient, DomainError> {
        // COALESCE keeps the first read timestamp
        let query = format!(
            "UPDATE message_recipients \
             SET read_at = COALESCE(read_at, $2), updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            RECIPIENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("mark recipient read", e))?;

        match row {
            Some(row) => Self::row_to_recipient(&row),
            None => Err(DomainError::not_found("Recipient")),
        }
    }
}
