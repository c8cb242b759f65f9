//! Push Transport Module
//!
//! - **FCM**: Firebase Cloud Messaging HTTP v1 with service-account auth
//! - **Simulated**: dev-mode transport used without usable credentials

use std::sync::Arc;

use nb_core::services::PushTransport;
use nb_shared::config::PushProviderConfig;

pub mod access_token;
pub mod fcm;
pub mod service_account;
pub mod simulated;

pub use access_token::{AccessTokenCache, AccessTokenProvider};
pub use fcm::{classify_fcm_error, fcm_error_code, FcmPushTransport};
pub use service_account::ServiceAccountKey;
pub use simulated::SimulatedPushTransport;

#[cfg(test)]
mod tests;

/// Shortened device token for log lines
pub(crate) fn token_hint(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}…", prefix)
}

/// Select the push transport for this process
///
/// Missing credentials, unparsable service-account JSON or an unusable
/// private key all select the simulated transport.
pub fn create_push_transport(config: Option<&PushProviderConfig>) -> Arc<dyn PushTransport> {
    let Some(config) = config else {
        tracing::warn!(
            event = "dev_mode",
            channel = "push",
            "Firebase service account not configured, push deliveries will be simulated"
        );
        return Arc::new(SimulatedPushTransport::new());
    };

    let transport = ServiceAccountKey::from_json(&config.service_account_json)
        .and_then(|key| FcmPushTransport::new(config, key, AccessTokenCache::global()));

    match transport {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize FCM push transport");
            tracing::warn!("Falling back to simulated push transport");
            Arc::new(SimulatedPushTransport::new())
        }
    }
}
