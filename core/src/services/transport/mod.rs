//! Channel transport interfaces
//!
//! Each channel has one transport selected at startup: a live adapter
//! talking to the provider or a simulated one that always succeeds. Services
//! never branch on credentials themselves; they only look at the receipt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::Message;
use crate::errors::DeliveryError;

/// Acknowledgement of one successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned identifier, if the provider returned one
    pub provider_message_id: Option<String>,
    /// True when no provider was contacted
    pub simulated: bool,
}

impl DeliveryReceipt {
    pub fn live(provider_message_id: Option<String>) -> Self {
        Self {
            provider_message_id,
            simulated: false,
        }
    }

    pub fn simulated() -> Self {
        Self {
            provider_message_id: None,
            simulated: true,
        }
    }
}

/// Push payload for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub message_id: String,
    pub title: String,
    pub body: String,
    /// Empty string when the message has no link
    pub link: String,
}

impl PushNotification {
    pub fn from_message(message: &Message) -> Self {
        Self {
            message_id: message.id.to_string(),
            title: message.title.clone(),
            body: message.body.clone(),
            link: message.link.clone().unwrap_or_default(),
        }
    }
}

/// SMS text for a message: title, body and link separated by blank lines
pub fn compose_sms_body(title: &str, body: &str, link: Option<&str>) -> String {
    match link.filter(|l| !l.is_empty()) {
        Some(link) => format!("{}\n\n{}\n\n{}", title, body, link),
        None => format!("{}\n\n{}", title, body),
    }
}

/// Outbound SMS capability
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Place one SMS to an E.164 number
    async fn send_sms(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError>;

    fn is_simulated(&self) -> bool;
}

/// Outbound push capability
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send to a single device token
    async fn send_push(
        &self,
        token: &str,
        notification: &PushNotification,
    ) -> Result<DeliveryReceipt, DeliveryError>;

    fn is_simulated(&self) -> bool;
}

/// Outbound email capability; no provider adapter ships with this crate
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;

    fn is_simulated(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_body_with_link() {
        assert_eq!(
            compose_sms_body("Snow day", "School closed", Some("https://s.example/1")),
            "Snow day\n\nSchool closed\n\nhttps://s.example/1"
        );
    }

    #[test]
    fn test_sms_body_without_link() {
        assert_eq!(compose_sms_body("T", "B", None), "T\n\nB");
        assert_eq!(compose_sms_body("T", "B", Some("")), "T\n\nB");
    }
}
