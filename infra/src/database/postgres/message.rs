//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use nb_core::domain::entities::Message;
use nb_core::errors::DomainError;
use nb_core::repositories::MessageRepository;

use super::{channel_names, channels_column, column, is_unique_violation, parsed_column, query_failed};

const MESSAGE_COLUMNS: &str = "id, sender_id, title, body, link, audience_type, audience_filter, \
     channels, scheduled_at, recurrence, created_at, sent_at";

pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
        Ok(Message {
            id: column(row, "id")?,
            sender_id: column(row, "sender_id")?,
            title: column(row, "title")?,
            body: column(row, "body")?,
            link: column(row, "link")?,
            audience_type: parsed_column(row, "audience_type")?,
            audience_filter: column(row, "audience_filter")?,
            channels: channels_column(row, "channels")?,
            scheduled_at: column(row, "scheduled_at")?,
            recurrence: column(row, "recurrence")?,
            created_at: column(row, "created_at")?,
            sent_at: column(row, "sent_at")?,
        })
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, DomainError> {
        let query = format!(
            "INSERT INTO messages ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            MESSAGE_COLUMNS
        );

        sqlx::query(&query)
            .bind(message.id)
            .bind(message.sender_id)
            .bind(&message.title)
            .bind(&message.body)
            .bind(&message.link)
            .bind(message.audience_type.as_str())
            .bind(&message.audience_filter)
            .bind(channel_names(&message.channels))
            .bind(message.scheduled_at)
            .bind(&message.recurrence)
            .bind(message.created_at)
            .bind(message.sent_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::validation("Message already exists")
                } else {
                    query_failed("create message", e)
                }
            })?;

        Ok(message)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, DomainError> {
        let query = format!("SELECT {} FROM messages WHERE id = $1", MESSAGE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find message", e))?;

        row.as_ref().map(Self::row_to_message).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        // recipients and delivery logs go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete message", e))?;

        Ok(())
    }
}
