use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::VerificationChallenge;
use crate::errors::DomainError;

/// Per-user verification challenge storage, at most one per user
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Store a challenge, replacing any existing one
    async fn store(&self, user_id: Uuid, challenge: VerificationChallenge)
        -> Result<(), DomainError>;

    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationChallenge>, DomainError>;

    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError>;
}
