use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::PushToken;
use crate::errors::DomainError;

/// Push token persistence
#[async_trait]
pub trait PushTokenRepository: Send + Sync {
    /// Insert unless the (user, token) pair already exists; true when inserted
    async fn insert_if_absent(&self, token: PushToken) -> Result<bool, DomainError>;

    /// Tokens for a user, oldest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<PushToken>, DomainError>;

    /// Remove every row carrying this token string; returns rows removed
    async fn delete_by_token(&self, token: &str) -> Result<u64, DomainError>;
}
