//! Audience resolution

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{AudienceType, Message, Role};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::ProfileRepository;

/// Resolves a message's audience descriptor to the set of target users
#[derive(Clone)]
pub struct AudienceResolver {
    profiles: Arc<dyn ProfileRepository>,
}

impl AudienceResolver {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// User ids targeted by `message`, without duplicates
    ///
    /// * `all` - every profile
    /// * `role` - profiles whose role equals `audience_filter.value`
    /// * `individual` - `audience_filter.user_ids` (or a single `value`),
    ///   restricted to existing profiles
    /// * `class` - rejected; there is no class membership to resolve against
    pub async fn resolve(&self, message: &Message) -> DomainResult<Vec<Uuid>> {
        let profiles = match message.audience_type {
            AudienceType::All => self.profiles.find_all().await?,
            AudienceType::Role => {
                let role: Role = message
                    .audience_value()
                    .ok_or_else(|| DomainError::validation("Role audience requires a role value"))?
                    .parse()
                    .map_err(|e: String| DomainError::validation(e))?;
                self.profiles.find_by_role(role).await?
            }
            AudienceType::Individual => {
                let ids = individual_ids(&message.audience_filter)?;
                self.profiles.find_by_ids(&ids).await?
            }
            AudienceType::Class => {
                return Err(DomainError::validation(
                    "Class audiences are not supported",
                ))
            }
        };

        let mut seen = HashSet::with_capacity(profiles.len());
        Ok(profiles
            .into_iter()
            .map(|p| p.id)
            .filter(|id| seen.insert(*id))
            .collect())
    }
}

fn individual_ids(filter: &serde_json::Value) -> DomainResult<Vec<Uuid>> {
    let raw: Vec<&str> = match (filter.get("user_ids"), filter.get("value")) {
        (Some(serde_json::Value::Array(items)), _) => {
            items.iter().filter_map(|v| v.as_str()).collect()
        }
        (_, Some(serde_json::Value::String(single))) => vec![single.as_str()],
        _ => {
            return Err(DomainError::validation(
                "Individual audience requires user_ids",
            ))
        }
    };

    raw.into_iter()
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| DomainError::validation(format!("Invalid user id: {}", s)))
        })
        .collect()
}
