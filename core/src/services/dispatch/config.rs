//! Configuration for the dispatch service

use chrono::Duration;
use nb_shared::DispatchConfig;

/// Configuration for the dispatch service
#[derive(Debug, Clone)]
pub struct DispatchServiceConfig {
    /// Maximum number of recipients processed at once
    pub concurrency: usize,
    /// Age after which an unrenewed (message, channel) claim is considered abandoned;
    /// a running dispatch renews its claim at a third of this
    pub claim_ttl: Duration,
}

impl Default for DispatchServiceConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            claim_ttl: Duration::seconds(300),
        }
    }
}

impl From<&DispatchConfig> for DispatchServiceConfig {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            claim_ttl: Duration::seconds(config.lock_ttl_secs as i64),
        }
    }
}
