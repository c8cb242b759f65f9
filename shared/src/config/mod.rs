//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Bearer credential verification
//! - `database` - Database connection and pool configuration
//! - `dispatch` - Fan-out concurrency and dispatch claims
//! - `environment` - Environment detection and logging configuration
//! - `providers` - SMS and push provider credentials
//! - `server` - HTTP server configuration
//!
//! Every section is built from a key lookup so that tests can feed values
//! without touching the process environment.

pub mod auth;
pub mod database;
pub mod dispatch;
pub mod environment;
pub mod providers;
pub mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use dispatch::DispatchConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use providers::{PushProviderConfig, SmsProviderConfig};
pub use server::ServerConfig;

/// Parse an optional value, falling back to `default` when absent or malformed
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a value and treat blank strings as absent
pub(crate) fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    /// `None` selects the simulated SMS transport
    pub sms: Option<SmsProviderConfig>,
    /// `None` selects the simulated push transport
    pub push: Option<PushProviderConfig>,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);
        Self {
            environment,
            server: ServerConfig::from_lookup(&lookup),
            database: DatabaseConfig::from_lookup(&lookup),
            auth: AuthConfig::from_lookup(&lookup),
            sms: SmsProviderConfig::from_lookup(&lookup),
            push: PushProviderConfig::from_lookup(&lookup),
            dispatch: DispatchConfig::from_lookup(&lookup),
            logging: LoggingConfig::from_lookup(&lookup, environment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_is_dev_mode() {
        let config = AppConfig::from_lookup(lookup_from(&[]));

        assert!(config.sms.is_none());
        assert!(config.push.is_none());
        assert!(config.database.is_none());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.dispatch.concurrency, 8);
    }

    #[test]
    fn test_full_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "production"),
            ("DATABASE_URL", "postgres://db/noticeboard"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_PHONE_NUMBER", "+15550001111"),
            ("FIREBASE_SERVICE_ACCOUNT", "{\"client_email\":\"svc@example.com\"}"),
            ("DISPATCH_CONCURRENCY", "3"),
        ]));

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgres://db/noticeboard")
        );
        assert_eq!(config.sms.as_ref().map(|s| s.account_sid.as_str()), Some("AC123"));
        assert!(config.push.is_some());
        assert_eq!(config.dispatch.concurrency, 3);
    }

    #[test]
    fn test_blank_values_count_as_absent() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TWILIO_ACCOUNT_SID", " "),
            ("TWILIO_AUTH_TOKEN", "secret"),
            ("TWILIO_PHONE_NUMBER", "+15550001111"),
        ]));

        assert!(config.sms.is_none());
    }
}
