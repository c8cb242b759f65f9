//! Bearer credential configuration

use serde::{Deserialize, Serialize};

use super::non_empty;

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT verification configuration for inbound requests
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,

    /// Expected `iss` claim, unchecked when absent
    #[serde(default)]
    pub issuer: Option<String>,

    /// Expected `aud` claim, unchecked when absent
    #[serde(default)]
    pub audience: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::from(DEFAULT_SECRET),
            issuer: None,
            audience: None,
        }
    }
}

impl AuthConfig {
    /// Create a new configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            jwt_secret: non_empty(lookup, "JWT_SECRET").unwrap_or_else(|| DEFAULT_SECRET.into()),
            issuer: non_empty(lookup, "JWT_ISSUER"),
            audience: non_empty(lookup, "JWT_AUDIENCE"),
        }
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_SECRET
    }
}
