//! # Infrastructure Layer
//!
//! Concrete implementations of the seams declared in `nb_core`:
//!
//! - **SMS**: Twilio-compatible REST transport and a simulated transport
//! - **Push**: Firebase Cloud Messaging HTTP v1 transport with a shared
//!   access-token cache, plus a simulated transport
//! - **Database**: PostgreSQL repositories using SQLx
//!
//! Transports are chosen once at startup. Missing or unusable credentials
//! select the simulated variant for that channel and are reported through
//! `tracing` rather than as startup failures.

pub mod database;
pub mod push;
pub mod sms;

use nb_core::errors::DomainError;

pub use database::{connect, postgres_repositories, DatabasePool};
pub use push::create_push_transport;
pub use sms::create_sms_transport;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider returned something we could not interpret
    #[error("Provider error: {0}")]
    Provider(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
