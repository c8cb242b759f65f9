//! Message entity: an authored announcement and its audience selector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Channel;

/// How the recipient set of a message is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceType {
    All,
    Role,
    Class,
    Individual,
}

impl AudienceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceType::All => "all",
            AudienceType::Role => "role",
            AudienceType::Class => "class",
            AudienceType::Individual => "individual",
        }
    }
}

impl std::str::FromStr for AudienceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(AudienceType::All),
            "role" => Ok(AudienceType::Role),
            "class" => Ok(AudienceType::Class),
            "individual" => Ok(AudienceType::Individual),
            _ => Err(format!("Unknown audience type: {}", s)),
        }
    }
}

/// Authoring input for a new message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub audience_type: AudienceType,
    /// Opaque selector payload, e.g. `{"value": "parent"}`
    pub audience_filter: serde_json::Value,
    pub channels: Vec<Channel>,
    /// Stored as given; nothing schedules on it
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Stored as given; nothing recurs on it
    pub recurrence: Option<String>,
}

/// Message entity, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub audience_type: AudienceType,
    pub audience_filter: serde_json::Value,
    /// Requested channels, non-empty and without duplicates
    pub channels: Vec<Channel>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub recurrence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Build a message from authoring input, stamping it as sent now
    ///
    /// Trims text fields, drops a blank link and removes duplicate channels
    /// while keeping their first-seen order.
    pub fn compose(input: NewMessage) -> Self {
        let now = Utc::now();
        let mut channels: Vec<Channel> = Vec::with_capacity(input.channels.len());
        for channel in input.channels {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }

        Self {
            id: Uuid::new_v4(),
            sender_id: input.sender_id,
            title: input.title.trim().to_string(),
            body: input.body.trim().to_string(),
            link: input
                .link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            audience_type: input.audience_type,
            audience_filter: input.audience_filter,
            channels,
            scheduled_at: input.scheduled_at,
            recurrence: input.recurrence,
            created_at: now,
            sent_at: Some(now),
        }
    }

    /// Check whether the author asked for delivery over `channel`
    pub fn requests(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    /// The `value` field of the audience filter, if it is a string
    pub fn audience_value(&self) -> Option<&str> {
        self.audience_filter.get("value").and_then(|v| v.as_str())
    }
}
