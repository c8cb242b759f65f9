//! Twilio SMS Transport
//!
//! Sends one message per call through the Twilio Messages resource:
//! a form-encoded `POST {api_base}/2010-04-01/Accounts/{sid}/Messages.json`
//! authenticated with HTTP basic auth (account SID / auth token).
//!
//! No retries happen here. A failed attempt is recorded by the dispatcher and
//! the recipient is not retried on the same channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use nb_core::errors::DeliveryError;
use nb_core::services::{DeliveryReceipt, SmsTransport};
use nb_shared::config::SmsProviderConfig;
use nb_shared::utils::phone::mask_phone_number;

use crate::InfrastructureError;

/// Subset of the Twilio message resource we read back
#[derive(Debug, Deserialize)]
struct TwilioMessageResource {
    sid: Option<String>,
}

/// Twilio SMS transport
pub struct TwilioSmsTransport {
    client: reqwest::Client,
    config: SmsProviderConfig,
}

impl TwilioSmsTransport {
    /// Create a new Twilio SMS transport
    pub fn new(config: SmsProviderConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.trim().is_empty() || config.auth_token.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "Twilio account SID and auth token are required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_phone_number(&config.from_number),
            timeout_secs = config.request_timeout_secs,
            "Twilio SMS transport initialized"
        );

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsTransport for TwilioSmsTransport {
    async fn send_sms(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError> {
        debug!(
            to = %mask_phone_number(to),
            length = body.len(),
            "Sending SMS via Twilio"
        );

        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(to = %mask_phone_number(to), error = %e, "Twilio request failed");
                DeliveryError::Network {
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| DeliveryError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(
                to = %mask_phone_number(to),
                status = status.as_u16(),
                "Twilio rejected SMS"
            );
            // Provider body is kept verbatim for the delivery log
            return Err(DeliveryError::ProviderRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let sid = serde_json::from_str::<TwilioMessageResource>(&text)
            .ok()
            .and_then(|resource| resource.sid);

        info!(
            to = %mask_phone_number(to),
            sid = sid.as_deref().unwrap_or("-"),
            "SMS accepted by Twilio"
        );

        Ok(DeliveryReceipt::live(sid))
    }

    fn is_simulated(&self) -> bool {
        false
    }
}
