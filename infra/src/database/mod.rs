//! Database module - PostgreSQL implementations using SQLx
//!
//! - Connection pool management and embedded migrations
//! - Repository implementations for every `nb_core` repository trait

use std::sync::Arc;

use nb_core::repositories::RepositorySet;

pub mod connection;
pub mod postgres;


pub use connection::{connect, DatabasePool};
pub use postgres::{
    PgChallengeRepository, PgDeliveryLogRepository, PgDispatchLockRepository,
    PgMessageRepository, PgProfileRepository, PgPushTokenRepository, PgRecipientRepository,
};

/// Repository set backed by the given pool
pub fn postgres_repositories(pool: &DatabasePool) -> RepositorySet {
    let pg = pool.get_pool().clone();

    RepositorySet {
        messages: Arc::new(PgMessageRepository::new(pg.clone())),
        recipients: Arc::new(PgRecipientRepository::new(pg.clone())),
        delivery_logs: Arc::new(PgDeliveryLogRepository::new(pg.clone())),
        push_tokens: Arc::new(PgPushTokenRepository::new(pg.clone())),
        profiles: Arc::new(PgProfileRepository::new(pg.clone())),
        challenges: Arc::new(PgChallengeRepository::new(pg.clone())),
        dispatch_locks: Arc::new(PgDispatchLockRepository::new(pg)),
    }
}
