//! In-memory repository implementations
//!
//! A single store implements every repository trait so that one
//! `Arc<InMemoryStore>` can back a whole `RepositorySet`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{
    DeliveryLogEntry, Message, Profile, PushToken, Recipient, RecipientStatus, Role,
    VerificationChallenge,
};
use crate::domain::value_objects::Channel;
use crate::errors::DomainError;

use super::{
    ChallengeRepository, DeliveryLogRepository, DispatchLockRepository, MessageRepository,
    ProfileRepository, PushTokenRepository, RecipientRepository,
};

#[derive(Default)]
pub struct InMemoryStore {
    messages: RwLock<HashMap<Uuid, Message>>,
    recipients: RwLock<Vec<Recipient>>,
    delivery_logs: RwLock<Vec<DeliveryLogEntry>>,
    push_tokens: RwLock<Vec<PushToken>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
    challenges: RwLock<HashMap<Uuid, VerificationChallenge>>,
    dispatch_claims: RwLock<HashMap<(Uuid, Channel), (Uuid, DateTime<Utc>)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create(&self, message: Message) -> Result<Message, DomainError> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            return Err(DomainError::validation("Message already exists"));
        }
        messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, DomainError> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.messages.write().await.remove(&id);
        self.recipients.write().await.retain(|r| r.message_id != id);
        self.delivery_logs.write().await.retain(|e| e.message_id != id);
        Ok(())
    }
}

#[async_trait]
impl RecipientRepository for InMemoryStore {
    async fn insert_many(&self, recipients: Vec<Recipient>) -> Result<(), DomainError> {
        let mut stored = self.recipients.write().await;
        for recipient in &recipients {
            if stored
                .iter()
                .any(|r| r.message_id == recipient.message_id && r.user_id == recipient.user_id)
            {
                return Err(DomainError::validation("Recipient already exists"));
            }
        }
        stored.extend(recipients);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipient>, DomainError> {
        Ok(self
            .recipients
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_by_message(&self, message_id: Uuid) -> Result<Vec<Recipient>, DomainError> {
        Ok(self
            .recipients
            .read()
            .await
            .iter()
            .filter(|r| r.message_id == message_id)
            .cloned()
            .collect())
    }

    async fn find_for_user(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Recipient>, DomainError> {
        Ok(self
            .recipients
            .read()
            .await
            .iter()
            .find(|r| r.message_id == message_id && r.user_id == user_id)
            .cloned())
    }

    async fn update_status(&self, id: Uuid, status: RecipientStatus) -> Result<(), DomainError> {
        let mut recipients = self.recipients.write().await;
        let recipient = recipients
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DomainError::not_found("Recipient"))?;
        recipient.status = status;
        recipient.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Recipient, DomainError> {
        let mut recipients = self.recipients.write().await;
        let recipient = recipients
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DomainError::not_found("Recipient"))?;
        if recipient.read_at.is_none() {
            recipient.read_at = Some(at);
            recipient.updated_at = Utc::now();
        }
        Ok(recipient.clone())
    }
}

#[async_trait]
impl DeliveryLogRepository for InMemoryStore {
    async fn append(&self, entry: DeliveryLogEntry) -> Result<DeliveryLogEntry, DomainError> {
        self.delivery_logs.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
    ) -> Result<Vec<DeliveryLogEntry>, DomainError> {
        Ok(self
            .delivery_logs
            .read()
            .await
            .iter()
            .filter(|e| e.recipient_id == recipient_id)
            .cloned()
            .collect())
    }

    async fn find_by_message(
        &self,
        message_id: Uuid,
    ) -> Result<Vec<DeliveryLogEntry>, DomainError> {
        Ok(self
            .delivery_logs
            .read()
            .await
            .iter()
            .filter(|e| e.message_id == message_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PushTokenRepository for InMemoryStore {
    async fn insert_if_absent(&self, token: PushToken) -> Result<bool, DomainError> {
        let mut tokens = self.push_tokens.write().await;
        if tokens
            .iter()
            .any(|t| t.user_id == token.user_id && t.token == token.token)
        {
            return Ok(false);
        }
        tokens.push(token);
        Ok(true)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<PushToken>, DomainError> {
        Ok(self
            .push_tokens
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_token(&self, token: &str) -> Result<u64, DomainError> {
        let mut tokens = self.push_tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| t.token != token);
        Ok((before - tokens.len()) as u64)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Profile>, DomainError> {
        Ok(self.profiles.read().await.values().cloned().collect())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, DomainError> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .filter(|p| p.role == role)
            .cloned()
            .collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DomainError> {
        let profiles = self.profiles.read().await;
        Ok(ids.iter().filter_map(|id| profiles.get(id).cloned()).collect())
    }

    async fn save(&self, profile: Profile) -> Result<Profile, DomainError> {
        self.profiles
            .write()
            .await
            .insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn mark_phone_verified(&self, id: Uuid, phone_e164: &str) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Profile"))?;
        profile.phone_verified = true;
        profile.phone_e164 = Some(phone_e164.to_string());
        Ok(())
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryStore {
    async fn store(
        &self,
        user_id: Uuid,
        challenge: VerificationChallenge,
    ) -> Result<(), DomainError> {
        self.challenges.write().await.insert(user_id, challenge);
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationChallenge>, DomainError> {
        Ok(self.challenges.read().await.get(&user_id).cloned())
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.challenges.write().await.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl DispatchLockRepository for InMemoryStore {
    async fn try_acquire(
        &self,
        message_id: Uuid,
        channel: Channel,
        ttl: Duration,
    ) -> Result<Option<Uuid>, DomainError> {
        let mut claims = self.dispatch_claims.write().await;
        let now = Utc::now();
        match claims.get(&(message_id, channel)) {
            Some((_, claimed_at)) if now - *claimed_at < ttl => Ok(None),
            _ => {
                let claim_id = Uuid::new_v4();
                claims.insert((message_id, channel), (claim_id, now));
                Ok(Some(claim_id))
            }
        }
    }

    async fn renew(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
    ) -> Result<bool, DomainError> {
        let mut claims = self.dispatch_claims.write().await;
        match claims.get_mut(&(message_id, channel)) {
            Some((owner, claimed_at)) if *owner == claim_id => {
                *claimed_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(
        &self,
        message_id: Uuid,
        channel: Channel,
        claim_id: Uuid,
    ) -> Result<(), DomainError> {
        let mut claims = self.dispatch_claims.write().await;
        if claims
            .get(&(message_id, channel))
            .is_some_and(|(owner, _)| *owner == claim_id)
        {
            claims.remove(&(message_id, channel));
        }
        Ok(())
    }
}
