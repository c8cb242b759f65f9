//! Database configuration module

use serde::{Deserialize, Serialize};

use super::{non_empty, parse_or};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            run_migrations: true,
        }
    }

    /// Returns `None` when `DATABASE_URL` is unset
    pub fn from_lookup<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_empty(lookup, "DATABASE_URL")?;
        let defaults = Self::new(url);

        Some(Self {
            max_connections: parse_or(lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            connect_timeout: parse_or(lookup, "DATABASE_CONNECT_TIMEOUT", defaults.connect_timeout),
            run_migrations: parse_or(lookup, "DATABASE_RUN_MIGRATIONS", defaults.run_migrations),
            ..defaults
        })
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}
