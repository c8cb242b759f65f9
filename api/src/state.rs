//! Shared application state
//!
//! Services are built once at startup and shared across workers. Transports
//! are selected from configuration: live when credentials exist, simulated
//! otherwise.

use std::sync::Arc;

use nb_core::domain::value_objects::Channel;
use nb_core::repositories::{InMemoryStore, RepositorySet};
use nb_core::services::{
    DispatchService, DispatchServiceConfig, MessageService, PushTransport, SmsTransport,
    TokenLifecycleManager, VerificationService, VerificationServiceConfig,
};
use nb_infra::{connect, create_push_transport, create_sms_transport, postgres_repositories, DatabasePool};
use nb_shared::config::{AppConfig, DispatchConfig};

pub struct AppState {
    pub dispatch: Arc<DispatchService>,
    pub verification: Arc<VerificationService>,
    pub messages: Arc<MessageService>,
    pub tokens: Arc<TokenLifecycleManager>,
    /// `None` when running on the in-memory store
    pub database: Option<DatabasePool>,
}

impl AppState {
    /// Wire services over an existing repository set and transports
    pub fn from_parts(
        repos: RepositorySet,
        sms: Arc<dyn SmsTransport>,
        push: Arc<dyn PushTransport>,
        dispatch: &DispatchConfig,
    ) -> Self {
        let verification = VerificationService::new(
            sms.clone(),
            repos.challenges.clone(),
            repos.profiles.clone(),
            VerificationServiceConfig::default(),
        );

        Self {
            verification: Arc::new(verification),
            messages: Arc::new(MessageService::new(repos.clone())),
            tokens: Arc::new(TokenLifecycleManager::new(repos.push_tokens.clone())),
            dispatch: Arc::new(DispatchService::new(
                repos,
                sms,
                push,
                DispatchServiceConfig::from(dispatch),
            )),
            database: None,
        }
    }

    /// Build the state described by `config`
    ///
    /// Without `DATABASE_URL` every repository lives in process memory and
    /// is lost on restart.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let sms = create_sms_transport(config.sms.as_ref());
        let push = create_push_transport(config.push.as_ref());

        match &config.database {
            Some(database) => {
                let pool = connect(database.clone()).await?;
                tracing::info!(
                    max_connections = database.max_connections,
                    "Connected to PostgreSQL"
                );
                let repos = postgres_repositories(&pool);
                let mut state = Self::from_parts(repos, sms, push, &config.dispatch);
                state.database = Some(pool);
                Ok(state)
            }
            None => {
                tracing::warn!(
                    event = "dev_mode",
                    "DATABASE_URL not set, using in-memory storage"
                );
                let repos = RepositorySet::in_memory(Arc::new(InMemoryStore::new()));
                Ok(Self::from_parts(repos, sms, push, &config.dispatch))
            }
        }
    }

    pub fn simulated_channels(&self) -> Vec<Channel> {
        self.dispatch.simulated_channels()
    }
}
