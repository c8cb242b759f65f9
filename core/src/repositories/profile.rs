use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Profile, Role};
use crate::errors::DomainError;

/// Profile reads for audience resolution and destination lookup
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError>;

    async fn find_all(&self) -> Result<Vec<Profile>, DomainError>;

    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, DomainError>;

    /// Existing profiles among `ids`; unknown ids are ignored
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DomainError>;

    /// Insert or replace a profile
    async fn save(&self, profile: Profile) -> Result<Profile, DomainError>;

    /// Record a verified phone number
    async fn mark_phone_verified(&self, id: Uuid, phone_e164: &str) -> Result<(), DomainError>;
}
