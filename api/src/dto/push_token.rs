use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPushTokenRequest {
    #[validate(length(min = 1, max = 4096, message = "Push token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPushTokenResponse {
    /// False when the token was already registered for this user
    pub registered: bool,
}
