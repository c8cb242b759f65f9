//! Main dispatch service implementation

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio::time::MissedTickBehavior;
use tracing;
use uuid::Uuid;

use crate::domain::entities::{DeliveryStatus, Message, PushToken, Recipient, RecipientStatus};
use crate::domain::value_objects::{Channel, DispatchSummary};
use crate::errors::{DeliveryError, DomainError, DomainResult};
use crate::repositories::RepositorySet;
use crate::services::delivery::{DeliveryLogWriter, RecipientStatusUpdater};
use crate::services::token_lifecycle::TokenLifecycleManager;
use crate::services::transport::{
    compose_sms_body, DeliveryReceipt, EmailTransport, PushNotification, PushTransport,
    SmsTransport,
};

use nb_shared::phone::mask_phone_number;

use super::config::DispatchServiceConfig;

/// Where a recipient can be reached on the channel being dispatched
enum Destination {
    Phone(String),
    PushTokens(Vec<PushToken>),
    Email(String),
}

/// Per-recipient result, tallied into the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecipientOutcome {
    Sent,
    Failed,
    Skipped,
}

/// Dispatch service fanning a message out to its recipients
pub struct DispatchService {
    repos: RepositorySet,
    sms: Arc<dyn SmsTransport>,
    push: Arc<dyn PushTransport>,
    email: Option<Arc<dyn EmailTransport>>,
    log_writer: DeliveryLogWriter,
    status_updater: RecipientStatusUpdater,
    tokens: TokenLifecycleManager,
    config: DispatchServiceConfig,
}

impl DispatchService {
    /// Create a new dispatch service
    ///
    /// # Arguments
    ///
    /// * `repos` - Persistence for messages, recipients, logs and tokens
    /// * `sms` - SMS transport selected at startup
    /// * `push` - Push transport selected at startup
    /// * `config` - Fan-out width and claim lifetime
    pub fn new(
        repos: RepositorySet,
        sms: Arc<dyn SmsTransport>,
        push: Arc<dyn PushTransport>,
        config: DispatchServiceConfig,
    ) -> Self {
        Self {
            log_writer: DeliveryLogWriter::new(repos.delivery_logs.clone()),
            status_updater: RecipientStatusUpdater::new(
                repos.recipients.clone(),
                repos.delivery_logs.clone(),
            ),
            tokens: TokenLifecycleManager::new(repos.push_tokens.clone()),
            repos,
            sms,
            push,
            email: None,
            config,
        }
    }

    /// Attach an email transport; without one email dispatch is rejected
    pub fn with_email_transport(mut self, email: Arc<dyn EmailTransport>) -> Self {
        self.email = Some(email);
        self
    }

    /// Channels whose transport is simulated
    pub fn simulated_channels(&self) -> Vec<Channel> {
        let mut channels = Vec::new();
        if self.push.is_simulated() {
            channels.push(Channel::Push);
        }
        if self.sms.is_simulated() {
            channels.push(Channel::Sms);
        }
        if self.email.as_ref().is_some_and(|e| e.is_simulated()) {
            channels.push(Channel::Email);
        }
        channels
    }

    pub async fn dispatch_sms(&self, message_id: Uuid) -> DomainResult<DispatchSummary> {
        self.dispatch(message_id, Channel::Sms).await
    }

    pub async fn dispatch_push(&self, message_id: Uuid) -> DomainResult<DispatchSummary> {
        self.dispatch(message_id, Channel::Push).await
    }

    pub async fn dispatch_email(&self, message_id: Uuid) -> DomainResult<DispatchSummary> {
        self.dispatch(message_id, Channel::Email).await
    }

    /// Deliver a message over one channel to every eligible recipient
    ///
    /// Fails as a whole only when the message or its recipients cannot be
    /// loaded, when the channel has no transport, or when another run holds
    /// the (message, channel) claim. Delivery failures are per recipient and
    /// only show up in the returned counts and the delivery log.
    ///
    /// The claim is renewed for as long as the run lasts. If it is lost
    /// anyway, recipients not yet started are skipped.
    pub async fn dispatch(&self, message_id: Uuid, channel: Channel) -> DomainResult<DispatchSummary> {
        if channel == Channel::Email && self.email.is_none() {
            return Err(DomainError::validation("Email delivery is not configured"));
        }

        let message = self
            .repos
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Message"))?;

        let Some(claim_id) = self
            .repos
            .dispatch_locks
            .try_acquire(message_id, channel, self.config.claim_ttl)
            .await?
        else {
            tracing::warn!(
                message_id = %message_id,
                channel = channel.as_str(),
                event = "dispatch_claim_rejected",
                "Dispatch already in progress"
            );
            return Err(DomainError::validation(
                "Dispatch already in progress for this message",
            ));
        };

        let claim_lost = AtomicBool::new(false);
        let run = self.run(&message, channel, &claim_lost);
        let heartbeat = self.hold_claim(message_id, channel, claim_id, &claim_lost);
        tokio::pin!(run);
        tokio::pin!(heartbeat);

        let result = tokio::select! {
            biased;
            result = &mut run => result,
            _ = &mut heartbeat => run.await,
        };

        if let Err(e) = self
            .repos
            .dispatch_locks
            .release(message_id, channel, claim_id)
            .await
        {
            tracing::error!(
                message_id = %message_id,
                channel = channel.as_str(),
                error = %e,
                event = "dispatch_claim_release_failed",
                "Failed to release dispatch claim"
            );
        }

        result
    }

    /// Keep the claim fresh; returns only once it has been taken over
    async fn hold_claim(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
        claim_lost: &AtomicBool,
    ) {
        let period = (self.config.claim_ttl / 3)
            .to_std()
            .unwrap_or_default()
            .max(std::time::Duration::from_millis(10));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match self
                .repos
                .dispatch_locks
                .renew(message_id, channel, claim_id)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    claim_lost.store(true, Ordering::SeqCst);
                    tracing::warn!(
                        message_id = %message_id,
                        channel = channel.as_str(),
                        event = "dispatch_claim_lost",
                        "Dispatch claim taken over, stopping run"
                    );
                    return;
                }
                Err(e) => {
                    tracing::error!(
                        message_id = %message_id,
                        channel = channel.as_str(),
                        error = %e,
                        event = "dispatch_claim_renew_failed",
                        "Failed to renew dispatch claim"
                    );
                }
            }
        }
    }

    async fn run(
        &self,
        message: &Message,
        channel: Channel,
        claim_lost: &AtomicBool,
    ) -> DomainResult<DispatchSummary> {
        let recipients = self.repos.recipients.find_by_message(message.id).await?;
        let candidates = self.select_candidates(message.id, channel, recipients).await?;

        tracing::info!(
            message_id = %message.id,
            channel = channel.as_str(),
            candidates = candidates.len(),
            event = "dispatch_started",
            "Starting delivery run"
        );

        let notification = PushNotification::from_message(message);
        let outcomes: Vec<RecipientOutcome> = stream::iter(candidates)
            .map(|recipient| self.deliver(message, channel, &notification, recipient, claim_lost))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut summary = DispatchSummary::default();
        for outcome in outcomes {
            match outcome {
                RecipientOutcome::Sent => summary.sent += 1,
                RecipientOutcome::Failed => summary.failed += 1,
                RecipientOutcome::Skipped => summary.skipped += 1,
            }
        }

        tracing::info!(
            message_id = %message.id,
            channel = channel.as_str(),
            sent = summary.sent,
            failed = summary.failed,
            skipped = summary.skipped,
            event = "dispatch_completed",
            "Delivery run complete"
        );

        Ok(summary)
    }

    /// Recipients that attempted `channel`, are not already failed, and have
    /// no terminal log entry for it yet
    ///
    /// A pending entry younger than the claim ttl means an attempt may still
    /// be in flight, so that recipient is left out too. Older unresolved
    /// attempts are retried.
    async fn select_candidates(
        &self,
        message_id: Uuid,
        channel: Channel,
        recipients: Vec<Recipient>,
    ) -> DomainResult<Vec<Recipient>> {
        let in_flight_since = Utc::now() - self.config.claim_ttl;
        let mut resolved = HashSet::new();
        let mut in_flight = HashSet::new();
        for entry in self.repos.delivery_logs.find_by_message(message_id).await? {
            if entry.channel != channel {
                continue;
            }
            if entry.status.is_terminal() {
                resolved.insert(entry.recipient_id);
            } else if entry.status == DeliveryStatus::Pending
                && entry.created_at > in_flight_since
            {
                in_flight.insert(entry.recipient_id);
            }
        }

        Ok(recipients
            .into_iter()
            .filter(|r| {
                r.attempted(channel)
                    && r.status != RecipientStatus::Failed
                    && !resolved.contains(&r.id)
            })
            .filter(|r| {
                let busy = in_flight.contains(&r.id);
                if busy {
                    tracing::debug!(
                        recipient_id = %r.id,
                        channel = channel.as_str(),
                        event = "recipient_in_flight",
                        "Recent unresolved attempt, leaving recipient alone"
                    );
                }
                !busy
            })
            .collect())
    }

    async fn deliver(
        &self,
        message: &Message,
        channel: Channel,
        notification: &PushNotification,
        recipient: Recipient,
        claim_lost: &AtomicBool,
    ) -> RecipientOutcome {
        if claim_lost.load(Ordering::SeqCst) {
            tracing::warn!(
                message_id = %message.id,
                recipient_id = %recipient.id,
                channel = channel.as_str(),
                event = "recipient_skipped",
                "Dispatch claim lost, not delivering"
            );
            return RecipientOutcome::Skipped;
        }
        match self.try_deliver(message, channel, notification, &recipient).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    message_id = %message.id,
                    recipient_id = %recipient.id,
                    channel = channel.as_str(),
                    error = %e,
                    event = "recipient_processing_failed",
                    "Failed to record delivery for recipient"
                );
                RecipientOutcome::Failed
            }
        }
    }

    async fn try_deliver(
        &self,
        message: &Message,
        channel: Channel,
        notification: &PushNotification,
        recipient: &Recipient,
    ) -> DomainResult<RecipientOutcome> {
        let Some(destination) = self.lookup_destination(channel, recipient.user_id).await? else {
            tracing::debug!(
                recipient_id = %recipient.id,
                user_id = %recipient.user_id,
                channel = channel.as_str(),
                event = "recipient_skipped",
                "No usable destination, skipping recipient"
            );
            return Ok(RecipientOutcome::Skipped);
        };

        self.log_writer
            .record_pending(message.id, recipient.id, channel)
            .await?;

        let outcome = match self.attempt(message, notification, destination).await {
            Ok(receipt) => {
                self.log_writer
                    .record_delivered(message.id, recipient.id, channel, &receipt)
                    .await?;
                if receipt.simulated {
                    tracing::info!(
                        message_id = %message.id,
                        recipient_id = %recipient.id,
                        channel = channel.as_str(),
                        event = "simulated_delivery",
                        "Dev mode delivery, no provider contacted"
                    );
                }
                RecipientOutcome::Sent
            }
            Err(error_text) => {
                self.log_writer
                    .record_failed(message.id, recipient.id, channel, &error_text)
                    .await?;
                tracing::warn!(
                    message_id = %message.id,
                    recipient_id = %recipient.id,
                    channel = channel.as_str(),
                    error = %error_text,
                    event = "delivery_failed",
                    "Delivery attempt failed"
                );
                RecipientOutcome::Failed
            }
        };

        self.status_updater.refresh(recipient.id).await?;
        Ok(outcome)
    }

    async fn lookup_destination(
        &self,
        channel: Channel,
        user_id: Uuid,
    ) -> DomainResult<Option<Destination>> {
        match channel {
            Channel::Push => {
                let tokens = self.tokens.tokens_for(user_id).await?;
                Ok((!tokens.is_empty()).then_some(Destination::PushTokens(tokens)))
            }
            Channel::Sms => {
                let profile = self.repos.profiles.find_by_id(user_id).await?;
                Ok(profile
                    .as_ref()
                    .and_then(|p| p.sms_destination())
                    .map(|phone| Destination::Phone(phone.to_string())))
            }
            Channel::Email => {
                let profile = self.repos.profiles.find_by_id(user_id).await?;
                Ok(profile
                    .as_ref()
                    .and_then(|p| p.email_destination())
                    .map(|email| Destination::Email(email.to_string())))
            }
        }
    }

    /// Run the transport; the error string is what the failed log entry carries
    async fn attempt(
        &self,
        message: &Message,
        notification: &PushNotification,
        destination: Destination,
    ) -> Result<DeliveryReceipt, String> {
        let body = compose_sms_body(&message.title, &message.body, message.link.as_deref());

        match destination {
            Destination::Phone(phone) => {
                tracing::debug!(phone = %mask_phone_number(&phone), "Sending SMS");
                self.sms
                    .send_sms(&phone, &body)
                    .await
                    .map_err(|e| e.to_string())
            }
            Destination::Email(address) => match &self.email {
                Some(email) => email
                    .send_email(&address, &message.title, &body)
                    .await
                    .map_err(|e| e.to_string()),
                None => Err("Email delivery is not configured".to_string()),
            },
            Destination::PushTokens(tokens) => {
                let mut errors = Vec::with_capacity(tokens.len());
                for token in tokens {
                    match self.push.send_push(&token.token, notification).await {
                        Ok(receipt) => return Ok(receipt),
                        Err(e) => {
                            if let DeliveryError::TokenInvalid { code, .. } = &e {
                                if let Err(prune_err) = self.tokens.prune(&token.token, code).await {
                                    tracing::error!(
                                        user_id = %token.user_id,
                                        error = %prune_err,
                                        event = "push_token_prune_failed",
                                        "Failed to remove invalid push token"
                                    );
                                }
                            }
                            errors.push(e.to_string());
                        }
                    }
                }
                Err(errors.join("; "))
            }
        }
    }
}
