//! Mock implementations for testing the verification service

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::{Profile, Role, VerificationChallenge};
use crate::errors::{DeliveryError, DomainError};
use crate::repositories::{ChallengeRepository, InMemoryStore, ProfileRepository};
use crate::services::transport::{DeliveryReceipt, SmsTransport};
use crate::services::verification::{VerificationService, VerificationServiceConfig};

// Mock SMS transport for testing
pub struct MockSmsTransport {
    pub sent_messages: Arc<Mutex<HashMap<String, String>>>,
    pub should_fail: bool,
    pub simulated: bool,
}

impl MockSmsTransport {
    pub fn new(should_fail: bool, simulated: bool) -> Self {
        Self {
            sent_messages: Arc::new(Mutex::new(HashMap::new())),
            should_fail,
            simulated,
        }
    }

    pub fn get_sent_body(&self, phone: &str) -> Option<String> {
        self.sent_messages.lock().unwrap().get(phone).cloned()
    }
}

#[async_trait]
impl SmsTransport for MockSmsTransport {
    async fn send_sms(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError> {
        if self.should_fail {
            return Err(DeliveryError::ProviderRejected {
                status: 401,
                body: "Authenticate".to_string(),
            });
        }
        self.sent_messages
            .lock()
            .unwrap()
            .insert(to.to_string(), body.to_string());
        if self.simulated {
            Ok(DeliveryReceipt::simulated())
        } else {
            Ok(DeliveryReceipt::live(Some("SM-test".to_string())))
        }
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }
}

pub async fn setup(
    sms: Arc<MockSmsTransport>,
) -> (VerificationService, Arc<InMemoryStore>, Uuid) {
    let store = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    store.save(Profile::new(user_id, Role::Parent)).await.unwrap();

    let service = VerificationService::new(
        sms,
        store.clone(),
        store.clone(),
        VerificationServiceConfig::default(),
    );
    (service, store, user_id)
}

// Store whose profile update or challenge clear can be made to fail
pub struct FailingStore {
    pub inner: Arc<InMemoryStore>,
    pub fail_mark_verified: bool,
    pub fail_clear: bool,
}

impl FailingStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            fail_mark_verified: false,
            fail_clear: false,
        }
    }
}

#[async_trait]
impl ProfileRepository for FailingStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError> {
        ProfileRepository::find_by_id(self.inner.as_ref(), id).await
    }

    async fn find_all(&self) -> Result<Vec<Profile>, DomainError> {
        self.inner.find_all().await
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, DomainError> {
        self.inner.find_by_role(role).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DomainError> {
        self.inner.find_by_ids(ids).await
    }

    async fn save(&self, profile: Profile) -> Result<Profile, DomainError> {
        self.inner.save(profile).await
    }

    async fn mark_phone_verified(&self, id: Uuid, phone_e164: &str) -> Result<(), DomainError> {
        if self.fail_mark_verified {
            return Err(DomainError::internal("profiles unavailable"));
        }
        self.inner.mark_phone_verified(id, phone_e164).await
    }
}

#[async_trait]
impl ChallengeRepository for FailingStore {
    async fn store(
        &self,
        user_id: Uuid,
        challenge: VerificationChallenge,
    ) -> Result<(), DomainError> {
        self.inner.store(user_id, challenge).await
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationChallenge>, DomainError> {
        self.inner.find(user_id).await
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.fail_clear {
            return Err(DomainError::internal("challenges unavailable"));
        }
        self.inner.clear(user_id).await
    }
}

pub async fn setup_failing(
    sms: Arc<MockSmsTransport>,
    configure: impl FnOnce(&mut FailingStore),
) -> (VerificationService, Arc<InMemoryStore>, Uuid) {
    let inner = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    inner.save(Profile::new(user_id, Role::Parent)).await.unwrap();

    let mut failing = FailingStore::new(inner.clone());
    configure(&mut failing);
    let failing = Arc::new(failing);

    let service = VerificationService::new(
        sms,
        failing.clone(),
        failing,
        VerificationServiceConfig::default(),
    );
    (service, inner, user_id)
}

/// Extract the 6-digit code from an SMS body
pub fn code_from_body(body: &str) -> String {
    body.rsplit(' ').next().unwrap().to_string()
}
