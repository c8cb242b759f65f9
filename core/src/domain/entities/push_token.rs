//! Push token entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A device or browser push subscription; (user, token) is unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl PushToken {
    pub fn new(user_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token: token.into(),
            created_at: Utc::now(),
        }
    }
}
