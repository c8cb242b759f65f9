//! Shared fixtures for HTTP tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use nb_api::middleware::Claims;
use nb_api::AppState;
use nb_core::domain::entities::{Profile, Role};
use nb_core::errors::DeliveryError;
use nb_core::repositories::{InMemoryStore, ProfileRepository, RepositorySet};
use nb_core::services::{DeliveryReceipt, PushTransport, SmsTransport};
use nb_infra::push::SimulatedPushTransport;
use nb_infra::sms::SimulatedSmsTransport;
use nb_shared::config::{AppConfig, DispatchConfig};

pub const SECRET: &str = "api-test-secret";

pub fn config() -> AppConfig {
    AppConfig::from_lookup(|key: &str| (key == "JWT_SECRET").then(|| SECRET.to_string()))
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 600) as usize,
        iss: None,
        aud: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    ("Authorization", format!("Bearer {}", token))
}

/// Live-looking SMS transport that records what it sends
#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsTransport for RecordingSms {
    async fn send_sms(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(DeliveryReceipt::live(Some("SM-test".to_string())))
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

pub struct Fixture {
    pub repos: RepositorySet,
    pub state: AppState,
}

impl Fixture {
    /// Simulated transports on a fresh in-memory store
    pub fn simulated() -> Self {
        Self::with_sms(Arc::new(SimulatedSmsTransport::new()))
    }

    pub fn with_sms(sms: Arc<dyn SmsTransport>) -> Self {
        let repos = RepositorySet::in_memory(Arc::new(InMemoryStore::new()));
        let push: Arc<dyn PushTransport> = Arc::new(SimulatedPushTransport::new());
        let state = AppState::from_parts(repos.clone(), sms, push, &DispatchConfig::default());
        Self { repos, state }
    }

    pub async fn profile(&self, phone: Option<&str>) -> Uuid {
        let mut profile = Profile::new(Uuid::new_v4(), Role::Parent);
        if let Some(phone) = phone {
            profile.phone_e164 = Some(phone.to_string());
            profile.phone_verified = true;
        }
        self.repos.profiles.save(profile).await.unwrap().id
    }
}
