//! Delivery log writer

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{DeliveryLogEntry, SIMULATED_DELIVERY_NOTE};
use crate::domain::value_objects::Channel;
use crate::errors::DomainResult;
use crate::repositories::DeliveryLogRepository;
use crate::services::transport::DeliveryReceipt;

/// Appends immutable entries for each delivery attempt
#[derive(Clone)]
pub struct DeliveryLogWriter {
    logs: Arc<dyn DeliveryLogRepository>,
}

impl DeliveryLogWriter {
    pub fn new(logs: Arc<dyn DeliveryLogRepository>) -> Self {
        Self { logs }
    }

    pub async fn record_pending(
        &self,
        message_id: Uuid,
        recipient_id: Uuid,
        channel: Channel,
    ) -> DomainResult<DeliveryLogEntry> {
        self.logs
            .append(DeliveryLogEntry::pending(message_id, recipient_id, channel))
            .await
    }

    /// Simulated receipts are tagged so they never pass for a provider ack
    pub async fn record_delivered(
        &self,
        message_id: Uuid,
        recipient_id: Uuid,
        channel: Channel,
        receipt: &DeliveryReceipt,
    ) -> DomainResult<DeliveryLogEntry> {
        let note = receipt
            .simulated
            .then(|| SIMULATED_DELIVERY_NOTE.to_string());
        self.logs
            .append(DeliveryLogEntry::delivered(
                message_id,
                recipient_id,
                channel,
                receipt.provider_message_id.clone(),
                note,
            ))
            .await
    }

    pub async fn record_failed(
        &self,
        message_id: Uuid,
        recipient_id: Uuid,
        channel: Channel,
        error: &str,
    ) -> DomainResult<DeliveryLogEntry> {
        self.logs
            .append(DeliveryLogEntry::failed(message_id, recipient_id, channel, error))
            .await
    }
}
