//! API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{ "message": "..." }` envelope used by acknowledgement endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Overall service health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// Channels currently running on simulated transports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub simulated_channels: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            version: version.into(),
            simulated_channels: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_simulated_channels(mut self, channels: Vec<String>) -> Self {
        if !channels.is_empty() {
            self.status = HealthStatus::Degraded;
        }
        self.simulated_channels = channels;
        self
    }
}
