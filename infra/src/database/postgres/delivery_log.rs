//! PostgreSQL implementation of DeliveryLogRepository
//!
//! The table is append-only: entries are inserted, never updated.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use nb_core::domain::entities::DeliveryLogEntry;
use nb_core::errors::DomainError;
use nb_core::repositories::DeliveryLogRepository;

use super::{column, parsed_column, query_failed};

const LOG_COLUMNS: &str =
    "id, message_id, recipient_id, channel, status, provider_message_id, error_message, created_at";

pub struct PgDeliveryLogRepository {
    pool: PgPool,
}

impl PgDeliveryLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &PgRow) -> Result<DeliveryLogEntry, DomainError> {
        Ok(DeliveryLogEntry {
            id: column(row, "id")?,
            message_id: column(row, "message_id")?,
            recipient_id: column(row, "recipient_id")?,
            channel: parsed_column(row, "channel")?,
            status: parsed_column(row, "status")?,
            provider_message_id: column(row, "provider_message_id")?,
            error_message: column(row, "error_message")?,
            created_at: column(row, "created_at")?,
        })
    }

    async fn select_where(
        &self,
        filter_column: &str,
        value: Uuid,
    ) -> Result<Vec<DeliveryLogEntry>, DomainError> {
        let query = format!(
            "SELECT {} FROM delivery_logs WHERE {} = $1 ORDER BY created_at, id",
            LOG_COLUMNS, filter_column
        );

        let rows = sqlx::query(&query)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list delivery logs", e))?;

        rows.iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl DeliveryLogRepository for PgDeliveryLogRepository {
    async fn append(&self, entry: DeliveryLogEntry) -> Result<DeliveryLogEntry, DomainError> {
        let query = format!(
            "INSERT INTO delivery_logs ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            LOG_COLUMNS
        );

        sqlx::query(&query)
            .bind(entry.id)
            .bind(entry.message_id)
            .bind(entry.recipient_id)
            .bind(entry.channel.as_str())
            .bind(entry.status.as_str())
            .bind(&entry.provider_message_id)
            .bind(&entry.error_message)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("append delivery log", e))?;

        Ok(entry)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
    ) -> Result<Vec<DeliveryLogEntry>, DomainError> {
        self.select_where("recipient_id", recipient_id).await
    }

    async fn find_by_message(
        &self,
        message_id: Uuid,
    ) -> Result<Vec<DeliveryLogEntry>, DomainError> {
        self.select_where("message_id", message_id).await
    }
}
