use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nb_core::domain::value_objects::DispatchSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub message_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub message: String,
    pub sent: u32,
    pub failed: u32,
    /// Recipients without a usable destination on this channel
    pub skipped: u32,
}

impl DispatchResponse {
    pub fn new(message: impl Into<String>, summary: DispatchSummary) -> Self {
        Self {
            message: message.into(),
            sent: summary.sent,
            failed: summary.failed,
            skipped: summary.skipped,
        }
    }
}
