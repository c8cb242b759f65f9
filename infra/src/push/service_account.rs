//! Firebase service-account credentials

use serde::Deserialize;

use crate::InfrastructureError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Fields of a Google service-account key file used for FCM
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse the raw JSON document
    ///
    /// Keys pasted into environment variables often carry literal `\n`
    /// sequences instead of line breaks; those are restored here.
    pub fn from_json(raw: &str) -> Result<Self, InfrastructureError> {
        let mut key: Self = serde_json::from_str(raw).map_err(|e| {
            InfrastructureError::Config(format!("Invalid service account JSON: {}", e))
        })?;

        key.private_key = key.private_key.replace("\\n", "\n");

        for (field, value) in [
            ("project_id", &key.project_id),
            ("client_email", &key.client_email),
            ("private_key", &key.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(InfrastructureError::Config(format!(
                    "Service account field '{}' is empty",
                    field
                )));
            }
        }

        Ok(key)
    }
}
