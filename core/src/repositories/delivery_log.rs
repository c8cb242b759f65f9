use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::DeliveryLogEntry;
use crate::errors::DomainError;

/// Append-only delivery log; there is deliberately no update or delete
#[async_trait]
pub trait DeliveryLogRepository: Send + Sync {
    async fn append(&self, entry: DeliveryLogEntry) -> Result<DeliveryLogEntry, DomainError>;

    /// Entries for one recipient in insertion order
    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
    ) -> Result<Vec<DeliveryLogEntry>, DomainError>;

    /// Entries for one message in insertion order
    async fn find_by_message(&self, message_id: Uuid)
        -> Result<Vec<DeliveryLogEntry>, DomainError>;
}
