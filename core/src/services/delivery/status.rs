//! Recipient aggregate status reducer

use std::sync::Arc;

use tracing;
use uuid::Uuid;

use crate::domain::entities::{DeliveryLogEntry, DeliveryStatus, Recipient, RecipientStatus};
use crate::domain::value_objects::Channel;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{DeliveryLogRepository, RecipientRepository};

/// Derive a recipient's aggregate status from its delivery log
///
/// `Delivered` as soon as any attempted channel has a delivered entry.
/// `Failed` once every attempted channel has a terminal failed entry and
/// none delivered. Otherwise `current` is kept, so a delivered recipient is
/// never downgraded.
pub fn reduce_status(
    attempted: &[Channel],
    entries: &[DeliveryLogEntry],
    current: RecipientStatus,
) -> RecipientStatus {
    let channel_has = |channel: Channel, status: DeliveryStatus| {
        entries
            .iter()
            .any(|e| e.channel == channel && e.status == status)
    };

    if current == RecipientStatus::Delivered
        || attempted
            .iter()
            .any(|c| channel_has(*c, DeliveryStatus::Delivered))
    {
        return RecipientStatus::Delivered;
    }

    if !attempted.is_empty()
        && attempted
            .iter()
            .all(|c| channel_has(*c, DeliveryStatus::Failed))
    {
        return RecipientStatus::Failed;
    }

    current
}

/// Applies `reduce_status` after each terminal log write
#[derive(Clone)]
pub struct RecipientStatusUpdater {
    recipients: Arc<dyn RecipientRepository>,
    logs: Arc<dyn DeliveryLogRepository>,
}

impl RecipientStatusUpdater {
    pub fn new(
        recipients: Arc<dyn RecipientRepository>,
        logs: Arc<dyn DeliveryLogRepository>,
    ) -> Self {
        Self { recipients, logs }
    }

    /// Recompute and persist the aggregate; returns the resulting status
    pub async fn refresh(&self, recipient_id: Uuid) -> DomainResult<RecipientStatus> {
        let recipient: Recipient = self
            .recipients
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Recipient"))?;
        let entries = self.logs.find_by_recipient(recipient_id).await?;

        let next = reduce_status(&recipient.channels_attempted, &entries, recipient.status);
        if next != recipient.status {
            self.recipients.update_status(recipient_id, next).await?;
            tracing::debug!(
                recipient_id = %recipient_id,
                from = recipient.status.as_str(),
                to = next.as_str(),
                event = "recipient_status_changed",
                "Recipient aggregate status updated"
            );
        }
        Ok(next)
    }
}
