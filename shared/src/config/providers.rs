//! Delivery provider credentials
//!
//! Absence of credentials is a supported configuration: the corresponding
//! channel runs on a simulated transport instead of failing at startup.

use serde::{Deserialize, Serialize};

use super::{non_empty, parse_or};

/// Default deadline for a single provider HTTP call
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Twilio-compatible SMS provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsProviderConfig {
    /// Account identifier, also the basic-auth user
    pub account_sid: String,
    /// Account secret, the basic-auth password
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
    /// Base URL of the REST API
    pub api_base: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl SmsProviderConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.twilio.com";

    /// Build from a key lookup; all three credentials must be present
    pub fn from_lookup<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let account_sid = non_empty(lookup, "TWILIO_ACCOUNT_SID")?;
        let auth_token = non_empty(lookup, "TWILIO_AUTH_TOKEN")?;
        let from_number = non_empty(lookup, "TWILIO_PHONE_NUMBER")?;

        Some(Self {
            account_sid,
            auth_token,
            from_number,
            api_base: non_empty(lookup, "TWILIO_API_BASE")
                .unwrap_or_else(|| Self::DEFAULT_API_BASE.to_string()),
            request_timeout_secs: parse_or(
                lookup,
                "SMS_REQUEST_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            ),
        })
    }
}

/// Firebase Cloud Messaging (HTTP v1) provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushProviderConfig {
    /// Raw service-account JSON document
    pub service_account_json: String,
    /// Base URL of the messaging API
    pub api_base: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl PushProviderConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://fcm.googleapis.com";

    pub fn from_lookup<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_account_json = non_empty(lookup, "FIREBASE_SERVICE_ACCOUNT")?;

        Some(Self {
            service_account_json,
            api_base: non_empty(lookup, "FCM_API_BASE")
                .unwrap_or_else(|| Self::DEFAULT_API_BASE.to_string()),
            request_timeout_secs: parse_or(
                lookup,
                "PUSH_REQUEST_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            ),
        })
    }
}
