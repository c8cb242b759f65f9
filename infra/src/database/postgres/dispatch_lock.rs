//! PostgreSQL implementation of DispatchLockRepository
//!
//! A claim is a row keyed by (message, channel) and stamped with the id of
//! the run holding it. Inserting succeeds when no claim exists; an existing
//! claim is only overwritten once it has gone unrenewed for the ttl, so a
//! crashed dispatcher cannot block the message forever. Renew and release
//! match on the claim id, so a run whose claim was taken over cannot touch
//! the new owner's row.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use nb_core::domain::value_objects::Channel;
use nb_core::errors::DomainError;
use nb_core::repositories::DispatchLockRepository;

use super::query_failed;

pub struct PgDispatchLockRepository {
    pool: PgPool,
}

impl PgDispatchLockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchLockRepository for PgDispatchLockRepository {
    async fn try_acquire(
        &self,
        message_id: Uuid,
        channel: Channel,
        ttl: Duration,
    ) -> Result<Option<Uuid>, DomainError> {
        let now = Utc::now();
        let claim_id = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO dispatch_claims (message_id, channel, claim_id, claimed_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (message_id, channel) DO UPDATE \
             SET claim_id = EXCLUDED.claim_id, claimed_at = EXCLUDED.claimed_at \
             WHERE dispatch_claims.claimed_at <= $5",
        )
        .bind(message_id)
        .bind(channel.as_str())
        .bind(claim_id)
        .bind(now)
        .bind(now - ttl)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("acquire dispatch claim", e))?;

        if result.rows_affected() == 1 {
            Ok(Some(claim_id))
        } else {
            warn!(
                message_id = %message_id,
                channel = %channel,
                "Dispatch claim held by another run"
            );
            Ok(None)
        }
    }

    async fn renew(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE dispatch_claims SET claimed_at = $4 \
             WHERE message_id = $1 AND channel = $2 AND claim_id = $3",
        )
        .bind(message_id)
        .bind(channel.as_str())
        .bind(claim_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("renew dispatch claim", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "DELETE FROM dispatch_claims \
             WHERE message_id = $1 AND channel = $2 AND claim_id = $3",
        )
        .bind(message_id)
        .bind(channel.as_str())
        .bind(claim_id)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("release dispatch claim", e))?;

        Ok(())
    }
}
