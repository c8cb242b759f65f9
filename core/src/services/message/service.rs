//! Message service implementation

use chrono::Utc;
use tracing;
use uuid::Uuid;

use crate::domain::entities::{Message, NewMessage, Recipient};
use crate::domain::value_objects::DeliverySummary;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::RepositorySet;

use super::audience::AudienceResolver;
use super::types::ComposeResult;

/// Message authoring, read receipts and delivery reporting
pub struct MessageService {
    repos: RepositorySet,
    audience: AudienceResolver,
}

impl MessageService {
    pub fn new(repos: RepositorySet) -> Self {
        Self {
            audience: AudienceResolver::new(repos.profiles.clone()),
            repos,
        }
    }

    /// Persist a message and fan it out to its audience
    ///
    /// Every resolved user gets a `pending` recipient whose attempted
    /// channels are a copy of the message's channel set. Nothing is stored
    /// when validation or audience resolution fails, and the message is
    /// removed again if its recipients cannot be stored.
    pub async fn compose(&self, input: NewMessage) -> DomainResult<ComposeResult> {
        let message = Message::compose(input);

        if message.title.is_empty() {
            return Err(DomainError::validation("Title is required"));
        }
        if message.body.is_empty() {
            return Err(DomainError::validation("Body is required"));
        }
        if message.channels.is_empty() {
            return Err(DomainError::validation("At least one channel is required"));
        }

        let user_ids = self.audience.resolve(&message).await?;
        let message = self.repos.messages.create(message).await?;

        let recipients: Vec<Recipient> = user_ids
            .into_iter()
            .map(|user_id| Recipient::pending(message.id, user_id, message.channels.clone()))
            .collect();
        let count = recipients.len();
        if let Err(e) = self.repos.recipients.insert_many(recipients).await {
            if let Err(cleanup) = self.repos.messages.delete(message.id).await {
                tracing::error!(
                    message_id = %message.id,
                    error = %cleanup,
                    event = "message_cleanup_failed",
                    "Failed to remove message without recipients"
                );
            }
            return Err(e);
        }

        tracing::info!(
            message_id = %message.id,
            sender_id = %message.sender_id,
            audience = message.audience_type.as_str(),
            recipients = count,
            event = "message_composed",
            "Message created"
        );

        Ok(ComposeResult {
            message,
            recipients: count,
        })
    }

    /// Record that `user_id` read the message; the first timestamp wins
    pub async fn mark_read(&self, message_id: Uuid, user_id: Uuid) -> DomainResult<Recipient> {
        let recipient = self
            .repos
            .recipients
            .find_for_user(message_id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Recipient"))?;

        self.repos.recipients.mark_read(recipient.id, Utc::now()).await
    }

    /// Counts of recipient statuses and log entries for a message
    pub async fn delivery_summary(&self, message_id: Uuid) -> DomainResult<DeliverySummary> {
        if self.repos.messages.find_by_id(message_id).await?.is_none() {
            return Err(DomainError::not_found("Message"));
        }

        let recipients = self.repos.recipients.find_by_message(message_id).await?;
        let logs = self.repos.delivery_logs.find_by_message(message_id).await?;
        Ok(DeliverySummary::build(message_id, &recipients, &logs))
    }
}
