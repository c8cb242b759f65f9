//! OAuth2 access tokens for the FCM HTTP v1 API
//!
//! A signed service-account assertion (RS256) is exchanged at the token
//! endpoint for a bearer token. Tokens are cached process-wide per service
//! account and refreshed shortly before they expire. Holding the async lock
//! across the exchange makes the refresh single-flight: concurrent senders
//! wait for the one in-flight exchange and reuse its result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use nb_core::errors::DeliveryError;

use super::service_account::ServiceAccountKey;
use crate::InfrastructureError;

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh this long before the provider-reported expiry
pub const REFRESH_MARGIN_SECS: i64 = 60;

const ASSERTION_LIFETIME_SECS: i64 = 3600;

static GLOBAL_CACHE: Lazy<Arc<AccessTokenCache>> =
    Lazy::new(|| Arc::new(AccessTokenCache::default()));

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Access tokens keyed by service-account email
#[derive(Debug, Default)]
pub struct AccessTokenCache {
    entries: Mutex<HashMap<String, CachedToken>>,
}

impl AccessTokenCache {
    /// The cache shared by every transport in this process
    pub fn global() -> Arc<Self> {
        GLOBAL_CACHE.clone()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// Issues bearer tokens for one service account
pub struct AccessTokenProvider {
    client: reqwest::Client,
    key: Arc<ServiceAccountKey>,
    encoding_key: EncodingKey,
    cache: Arc<AccessTokenCache>,
}

impl AccessTokenProvider {
    /// Fails when the private key is not a usable RSA PEM
    pub fn new(
        client: reqwest::Client,
        key: Arc<ServiceAccountKey>,
        cache: Arc<AccessTokenCache>,
    ) -> Result<Self, InfrastructureError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            InfrastructureError::Config(format!("Invalid service account private key: {}", e))
        })?;

        Ok(Self {
            client,
            key,
            encoding_key,
            cache,
        })
    }

    /// Cached token, or a fresh one when missing or about to expire
    pub async fn access_token(&self) -> Result<String, DeliveryError> {
        let mut entries = self.cache.entries.lock().await;
        let now = Utc::now();

        if let Some(cached) = entries.get(&self.key.client_email) {
            if cached.is_fresh_at(now) {
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let access_token = fresh.access_token.clone();
        entries.insert(self.key.client_email.clone(), fresh);

        Ok(access_token)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, DeliveryError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key).map_err(|e| {
            DeliveryError::Configuration {
                message: format!("Failed to sign service account assertion: {}", e),
            }
        })
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, DeliveryError> {
        let assertion = self.sign_assertion(now)?;
        debug!(account = %self.key.client_email, "Requesting FCM access token");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| DeliveryError::Network {
                message: format!("Access token request failed: {}", e),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| DeliveryError::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(
                account = %self.key.client_email,
                status = status.as_u16(),
                "Access token exchange rejected"
            );
            return Err(DeliveryError::ProviderRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&text).map_err(|e| DeliveryError::Configuration {
                message: format!("Unexpected token response: {}", e),
            })?;

        info!(
            account = %self.key.client_email,
            expires_in = token.expires_in,
            "FCM access token refreshed"
        );

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_refreshed_inside_margin() {
        let now = Utc::now();
        let cached = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::seconds(REFRESH_MARGIN_SECS - 1),
        };
        assert!(!cached.is_fresh_at(now));

        let cached = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::seconds(REFRESH_MARGIN_SECS + 120),
        };
        assert!(cached.is_fresh_at(now));
    }

    #[test]
    fn test_invalid_private_key_rejected() {
        let key = Arc::new(ServiceAccountKey {
            project_id: "p".to_string(),
            client_email: "svc@p.iam.gserviceaccount.com".to_string(),
            private_key: "not a pem".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        });

        let result = AccessTokenProvider::new(
            reqwest::Client::new(),
            key,
            Arc::new(AccessTokenCache::default()),
        );
        assert!(result.is_err());
    }
}
