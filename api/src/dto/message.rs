use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use nb_core::domain::entities::{AudienceType, NewMessage};
use nb_core::domain::value_objects::Channel;

use crate::handlers::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComposeMessageRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
    /// One of `all`, `role`, `class`, `individual`
    pub audience_type: String,
    #[serde(default)]
    pub audience_filter: Option<serde_json::Value>,
    #[validate(length(min = 1, message = "At least one channel is required"))]
    pub channels: Vec<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurrence: Option<String>,
}

impl ComposeMessageRequest {
    /// Convert into authoring input on behalf of `sender_id`
    pub fn into_new_message(self, sender_id: Uuid) -> Result<NewMessage, ApiError> {
        let audience_type: AudienceType =
            self.audience_type.parse().map_err(ApiError::BadRequest)?;

        let mut channels: Vec<Channel> = Vec::with_capacity(self.channels.len());
        for raw in &self.channels {
            let channel: Channel = raw.parse().map_err(ApiError::BadRequest)?;
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }

        Ok(NewMessage {
            sender_id,
            title: self.title.trim().to_string(),
            body: self.body,
            link: self.link.filter(|l| !l.trim().is_empty()),
            audience_type,
            audience_filter: self
                .audience_filter
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            channels,
            scheduled_at: self.scheduled_at,
            recurrence: self.recurrence,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeMessageResponse {
    pub id: Uuid,
    pub recipients: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(channels: &[&str], audience: &str) -> ComposeMessageRequest {
        serde_json::from_value(json!({
            "title": " Snow day ",
            "body": "School closed",
            "link": "",
            "audienceType": audience,
            "channels": channels,
        }))
        .unwrap()
    }

    #[test]
    fn test_into_new_message_dedups_channels_and_drops_blank_link() {
        let sender = Uuid::new_v4();
        let input = request(&["sms", "push", "sms"], "all")
            .into_new_message(sender)
            .unwrap();

        assert_eq!(input.channels, vec![Channel::Sms, Channel::Push]);
        assert_eq!(input.title, "Snow day");
        assert_eq!(input.link, None);
        assert_eq!(input.audience_filter, json!({}));
        assert_eq!(input.sender_id, sender);
    }

    #[test]
    fn test_unknown_channel_or_audience_rejected() {
        assert!(matches!(
            request(&["fax"], "all").into_new_message(Uuid::new_v4()),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            request(&["sms"], "everyone").into_new_message(Uuid::new_v4()),
            Err(ApiError::BadRequest(_))
        ));
    }
}
