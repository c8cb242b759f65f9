//! Repository interfaces for persistence
//!
//! The storage engine is an external collaborator; services only see
//! these traits. `memory` holds the in-process implementation used by
//! tests and by dev-mode deployments without a database.

pub mod challenge;
pub mod delivery_log;
pub mod dispatch_lock;
pub mod memory;
pub mod message;
pub mod profile;
pub mod push_token;
pub mod recipient;

use std::sync::Arc;

pub use challenge::ChallengeRepository;
pub use delivery_log::DeliveryLogRepository;
pub use dispatch_lock::DispatchLockRepository;
pub use memory::InMemoryStore;
pub use message::MessageRepository;
pub use profile::ProfileRepository;
pub use push_token::PushTokenRepository;
pub use recipient::RecipientRepository;

/// Every repository a service may need, behind trait objects
#[derive(Clone)]
pub struct RepositorySet {
    pub messages: Arc<dyn MessageRepository>,
    pub recipients: Arc<dyn RecipientRepository>,
    pub delivery_logs: Arc<dyn DeliveryLogRepository>,
    pub push_tokens: Arc<dyn PushTokenRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub challenges: Arc<dyn ChallengeRepository>,
    pub dispatch_locks: Arc<dyn DispatchLockRepository>,
}

impl RepositorySet {
    /// Back every repository with one shared in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            messages: store.clone(),
            recipients: store.clone(),
            delivery_logs: store.clone(),
            push_tokens: store.clone(),
            profiles: store.clone(),
            challenges: store.clone(),
            dispatch_locks: store,
        }
    }
}
