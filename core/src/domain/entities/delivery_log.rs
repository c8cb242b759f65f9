//! Delivery log entry: the append-only audit trail of delivery attempts
//!
//! For a given (recipient, channel) a dispatch run appends one `pending`
//! entry followed by exactly one terminal entry. Entries are never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Channel;

/// Error-message marker carried by deliveries that never reached a provider
pub const SIMULATED_DELIVERY_NOTE: &str = "dev mode: simulated delivery, no provider configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryStatus::Pending)
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "failed" => Ok(DeliveryStatus::Failed),
            _ => Err(format!("Unknown delivery status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLogEntry {
    pub id: Uuid,
    pub message_id: Uuid,
    pub recipient_id: Uuid,
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryLogEntry {
    fn new(message_id: Uuid, recipient_id: Uuid, channel: Channel, status: DeliveryStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            recipient_id,
            channel,
            status,
            provider_message_id: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn pending(message_id: Uuid, recipient_id: Uuid, channel: Channel) -> Self {
        Self::new(message_id, recipient_id, channel, DeliveryStatus::Pending)
    }

    /// `note` lands in `error_message`; simulated deliveries use it to flag themselves
    pub fn delivered(
        message_id: Uuid,
        recipient_id: Uuid,
        channel: Channel,
        provider_message_id: Option<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            provider_message_id,
            error_message: note,
            ..Self::new(message_id, recipient_id, channel, DeliveryStatus::Delivered)
        }
    }

    pub fn failed(
        message_id: Uuid,
        recipient_id: Uuid,
        channel: Channel,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error_message: Some(error.into()),
            ..Self::new(message_id, recipient_id, channel, DeliveryStatus::Failed)
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.status == DeliveryStatus::Delivered
            && self.error_message.as_deref() == Some(SIMULATED_DELIVERY_NOTE)
    }
}
