//! PostgreSQL implementations of the `nb_core` repository traits
//!
//! Queries are checked at runtime (`sqlx::query`) so the crate builds without
//! a live database. Column decoding failures surface as internal errors.

pub mod challenge;
pub mod delivery_log;
pub mod dispatch_lock;
pub mod message;
pub mod profile;
pub mod push_token;
pub mod recipient;

use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use tracing::error;

use nb_core::domain::value_objects::Channel;
use nb_core::errors::DomainError;

pub use challenge::PgChallengeRepository;
pub use delivery_log::PgDeliveryLogRepository;
pub use dispatch_lock::PgDispatchLockRepository;
pub use message::PgMessageRepository;
pub use profile::PgProfileRepository;
pub use push_token::PgPushTokenRepository;
pub use recipient::PgRecipientRepository;

/// Log and wrap a failed query
pub(crate) fn query_failed(operation: &str, e: sqlx::Error) -> DomainError {
    error!(operation, error = %e, "Database query failed");
    DomainError::Internal {
        message: format!("Failed to {}: {}", operation, e),
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

/// Decode a text column into one of the domain enums
pub(crate) fn parsed_column<T>(row: &PgRow, name: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = String>,
{
    let raw: String = column(row, name)?;
    raw.parse().map_err(|e: String| DomainError::Internal {
        message: format!("Invalid {}: {}", name, e),
    })
}

pub(crate) fn channels_column(row: &PgRow, name: &str) -> Result<Vec<Channel>, DomainError> {
    let raw: Vec<String> = column(row, name)?;
    raw.iter()
        .map(|c| {
            c.parse().map_err(|e: String| DomainError::Internal {
                message: format!("Invalid {}: {}", name, e),
            })
        })
        .collect()
}

pub(crate) fn channel_names(channels: &[Channel]) -> Vec<String> {
    channels.iter().map(|c| c.as_str().to_string()).collect()
}
