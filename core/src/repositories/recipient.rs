use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{Recipient, RecipientStatus};
use crate::errors::DomainError;

/// Recipient persistence
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// Insert a fan-out batch
    async fn insert_many(&self, recipients: Vec<Recipient>) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipient>, DomainError>;

    async fn find_by_message(&self, message_id: Uuid) -> Result<Vec<Recipient>, DomainError>;

    async fn find_for_user(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Recipient>, DomainError>;

    /// Overwrite the aggregate status and bump `updated_at`
    async fn update_status(&self, id: Uuid, status: RecipientStatus) -> Result<(), DomainError>;

    /// Set `read_at` unless already set; returns the stored row
    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Recipient, DomainError>;
}
