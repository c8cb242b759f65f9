//! Recipient entity: one row per message and target user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Channel;

/// Aggregate delivery outcome across every attempted channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientStatus {
    Pending,
    Delivered,
    Failed,
}

impl RecipientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientStatus::Pending => "pending",
            RecipientStatus::Delivered => "delivered",
            RecipientStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for RecipientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecipientStatus::Pending),
            "delivered" => Ok(RecipientStatus::Delivered),
            "failed" => Ok(RecipientStatus::Failed),
            _ => Err(format!("Unknown recipient status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: Uuid,
    pub message_id: Uuid,
    pub user_id: Uuid,
    /// Copy of the message's channel set at fan-out time
    pub channels_attempted: Vec<Channel>,
    pub status: RecipientStatus,
    /// Set by the end user only
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipient {
    /// Create a recipient awaiting delivery
    pub fn pending(message_id: Uuid, user_id: Uuid, channels_attempted: Vec<Channel>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            message_id,
            user_id,
            channels_attempted,
            status: RecipientStatus::Pending,
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn attempted(&self, channel: Channel) -> bool {
        self.channels_attempted.contains(&channel)
    }
}
