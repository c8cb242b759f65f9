//! Aggregated delivery outcomes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::Channel;
use crate::domain::entities::{DeliveryLogEntry, DeliveryStatus, Recipient, RecipientStatus};

/// Result of one dispatch run, returned to the caller for display only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub sent: u32,
    pub failed: u32,
    /// Candidates without a usable destination
    pub skipped: u32,
}

/// Per-status tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u32,
    pub delivered: u32,
    pub failed: u32,
}

impl StatusCounts {
    fn add_log(&mut self, status: DeliveryStatus) {
        match status {
            DeliveryStatus::Pending => self.pending += 1,
            DeliveryStatus::Delivered => self.delivered += 1,
            DeliveryStatus::Failed => self.failed += 1,
        }
    }

    fn add_recipient(&mut self, status: RecipientStatus) {
        match status {
            RecipientStatus::Pending => self.pending += 1,
            RecipientStatus::Delivered => self.delivered += 1,
            RecipientStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.pending + self.delivered + self.failed
    }
}

/// Dashboard view of a message's delivery state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySummary {
    pub message_id: Uuid,
    /// Aggregate recipient statuses
    pub recipients: StatusCounts,
    /// Read receipts among recipients
    pub read: u32,
    /// Log entries by status across all channels
    pub logs: StatusCounts,
    /// Log entries by status for each channel that has any
    pub by_channel: BTreeMap<Channel, StatusCounts>,
}

impl DeliverySummary {
    pub fn build(message_id: Uuid, recipients: &[Recipient], logs: &[DeliveryLogEntry]) -> Self {
        let mut summary = Self {
            message_id,
            recipients: StatusCounts::default(),
            read: 0,
            logs: StatusCounts::default(),
            by_channel: BTreeMap::new(),
        };

        for recipient in recipients {
            summary.recipients.add_recipient(recipient.status);
            if recipient.read_at.is_some() {
                summary.read += 1;
            }
        }

        for entry in logs {
            summary.logs.add_log(entry.status);
            summary
                .by_channel
                .entry(entry.channel)
                .or_default()
                .add_log(entry.status);
        }

        summary
    }
}
