//! Firebase Cloud Messaging HTTP v1 transport
//!
//! One request per device token to
//! `{api_base}/v1/projects/{project_id}/messages:send`. Provider errors are
//! classified so that tokens FCM no longer accepts can be pruned.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use nb_core::errors::DeliveryError;
use nb_core::services::{DeliveryReceipt, PushNotification, PushTransport};
use nb_shared::config::PushProviderConfig;

use super::access_token::{AccessTokenCache, AccessTokenProvider};
use super::service_account::ServiceAccountKey;
use super::token_hint;
use crate::InfrastructureError;

/// Error codes meaning the device token will never work again
pub const TOKEN_INVALID_CODES: [&str; 2] = ["UNREGISTERED", "INVALID_ARGUMENT"];

const WEBPUSH_ICON: &str = "/favicon.ico";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: FcmData<'a>,
    webpush: WebpushConfig,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

/// Data values must be strings
#[derive(Debug, Serialize)]
struct FcmData<'a> {
    #[serde(rename = "messageId")]
    message_id: &'a str,
    link: &'a str,
}

#[derive(Debug, Serialize)]
struct WebpushConfig {
    notification: WebpushNotification,
}

#[derive(Debug, Serialize)]
struct WebpushNotification {
    icon: &'static str,
    badge: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: Option<String>,
}

/// Extract the provider error code from an FCM error body
///
/// The first detail's `errorCode` wins; otherwise the top-level `status`.
pub fn fcm_error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;

    error
        .get("details")
        .and_then(|details| details.get(0))
        .and_then(|detail| detail.get("errorCode"))
        .and_then(Value::as_str)
        .or_else(|| error.get("status").and_then(Value::as_str))
        .map(str::to_string)
}

/// Map a non-success FCM response onto a delivery error
pub fn classify_fcm_error(status: u16, body: String) -> DeliveryError {
    match fcm_error_code(&body) {
        Some(code) if TOKEN_INVALID_CODES.contains(&code.as_str()) => {
            DeliveryError::TokenInvalid { code, body }
        }
        _ => DeliveryError::ProviderRejected { status, body },
    }
}

/// FCM HTTP v1 push transport
pub struct FcmPushTransport {
    client: reqwest::Client,
    project_id: String,
    api_base: String,
    tokens: AccessTokenProvider,
}

impl FcmPushTransport {
    pub fn new(
        config: &PushProviderConfig,
        key: ServiceAccountKey,
        cache: Arc<AccessTokenCache>,
    ) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let project_id = key.project_id.clone();
        let tokens = AccessTokenProvider::new(client.clone(), Arc::new(key), cache)?;

        info!(
            project_id = %project_id,
            timeout_secs = config.request_timeout_secs,
            "FCM push transport initialized"
        );

        Ok(Self {
            client,
            project_id,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.api_base, self.project_id
        )
    }
}

#[async_trait]
impl PushTransport for FcmPushTransport {
    async fn send_push(
        &self,
        token: &str,
        notification: &PushNotification,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let access_token = self.tokens.access_token().await?;

        let request = SendRequest {
            message: FcmMessage {
                token,
                notification: FcmNotification {
                    title: &notification.title,
                    body: &notification.body,
                },
                data: FcmData {
                    message_id: &notification.message_id,
                    link: &notification.link,
                },
                webpush: WebpushConfig {
                    notification: WebpushNotification {
                        icon: WEBPUSH_ICON,
                        badge: WEBPUSH_ICON,
                    },
                },
            },
        };

        debug!(token = %token_hint(token), message_id = %notification.message_id, "Sending push via FCM");

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| DeliveryError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let err = classify_fcm_error(status.as_u16(), text);
            warn!(
                token = %token_hint(token),
                status = status.as_u16(),
                token_invalid = err.invalidates_token(),
                "FCM rejected push"
            );
            return Err(err);
        }

        let name = serde_json::from_str::<SendResponse>(&text)
            .ok()
            .and_then(|r| r.name);

        Ok(DeliveryReceipt::live(name))
    }

    fn is_simulated(&self) -> bool {
        false
    }
}
