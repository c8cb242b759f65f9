//! Push token registration and pruning

use std::sync::Arc;

use tracing;
use uuid::Uuid;

use crate::domain::entities::PushToken;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::PushTokenRepository;

/// Owns the push-token lifecycle: registration by users and removal of
/// tokens the provider reports as permanently invalid
#[derive(Clone)]
pub struct TokenLifecycleManager {
    tokens: Arc<dyn PushTokenRepository>,
}

impl TokenLifecycleManager {
    pub fn new(tokens: Arc<dyn PushTokenRepository>) -> Self {
        Self { tokens }
    }

    /// Register a token for a user; false when the pair already existed
    pub async fn register(&self, user_id: Uuid, token: &str) -> DomainResult<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::validation("Push token must not be empty"));
        }

        let inserted = self
            .tokens
            .insert_if_absent(PushToken::new(user_id, token))
            .await?;
        tracing::info!(
            user_id = %user_id,
            inserted = inserted,
            event = "push_token_registered",
            "Push token registration processed"
        );
        Ok(inserted)
    }

    pub async fn tokens_for(&self, user_id: Uuid) -> DomainResult<Vec<PushToken>> {
        self.tokens.find_by_user(user_id).await
    }

    /// Delete a token the provider rejected as unregistered or malformed
    pub async fn prune(&self, token: &str, provider_code: &str) -> DomainResult<u64> {
        let removed = self.tokens.delete_by_token(token).await?;
        tracing::warn!(
            provider_code = provider_code,
            removed = removed,
            event = "push_token_pruned",
            "Removed invalid push token"
        );
        Ok(removed)
    }
}
