use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::value_objects::Channel;
use crate::errors::DomainError;

/// Claims that keep two dispatch runs off the same (message, channel)
///
/// Each claim carries an id handed to the run that took it. Only that run
/// can renew or release it.
#[async_trait]
pub trait DispatchLockRepository: Send + Sync {
    /// Take the claim; `None` if another live claim holds it
    ///
    /// A claim not renewed within `ttl` counts as abandoned and is taken over.
    async fn try_acquire(
        &self,
        message_id: Uuid,
        channel: Channel,
        ttl: Duration,
    ) -> Result<Option<Uuid>, DomainError>;

    /// Refresh the claim's timestamp; false once it belongs to someone else
    async fn renew(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
    ) -> Result<bool, DomainError>;

    /// Drop the claim if `claim_id` still owns it
    async fn release(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
    ) -> Result<(), DomainError>;
}
