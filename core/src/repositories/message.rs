use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Message;
use crate::errors::DomainError;

/// Message persistence; messages are immutable after creation
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: Message) -> Result<Message, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, DomainError>;

    /// Remove a message along with its recipients and log entries
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
