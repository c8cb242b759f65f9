//! Dispatch tuning

use serde::{Deserialize, Serialize};

use super::parse_or;

/// Fan-out and claim settings for dispatch runs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Maximum in-flight provider calls per dispatch run
    pub concurrency: usize,
    /// Seconds after which an unreleased dispatch claim may be taken over
    pub lock_ttl_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            lock_ttl_secs: 300,
        }
    }
}

impl DispatchConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            concurrency: parse_or(lookup, "DISPATCH_CONCURRENCY", defaults.concurrency).max(1),
            lock_ttl_secs: parse_or(lookup, "DISPATCH_LOCK_TTL_SECS", defaults.lock_ttl_secs),
        }
    }
}
