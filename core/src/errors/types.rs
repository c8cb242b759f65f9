//! Error types for verification and per-recipient delivery

use thiserror::Error;

/// Verification flow failures
///
/// Display texts are returned to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("No verification code found. Please request a new code.")]
    NotFound,

    #[error("Verification code expired. Please request a new code.")]
    Expired,

    #[error("Invalid verification code")]
    Mismatch,

    #[error("Invalid phone number format")]
    InvalidPhone,

    #[error("Failed to send verification code: {reason}")]
    SmsDeliveryFailed { reason: String },
}

/// Outcome of a failed delivery attempt to one destination
///
/// These never abort a dispatch run. `Display` output is what ends up in the
/// delivery log's error text, so provider bodies are reproduced verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Non-success HTTP response from the provider
    #[error("{body}")]
    ProviderRejected { status: u16, body: String },

    /// Transport failure before a response was received
    #[error("{message}")]
    Network { message: String },

    /// Provider reported the push token as permanently invalid
    #[error("{body}")]
    TokenInvalid { code: String, body: String },

    /// Credentials present but unusable
    #[error("{message}")]
    Configuration { message: String },
}

impl DeliveryError {
    /// Whether the destination should be removed from storage
    pub fn invalidates_token(&self) -> bool {
        matches!(self, DeliveryError::TokenInvalid { .. })
    }
}
