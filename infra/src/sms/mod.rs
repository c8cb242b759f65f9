//! SMS Transport Module
//!
//! Provides the outbound SMS implementations behind `nb_core`'s
//! `SmsTransport`:
//!
//! - **Twilio**: REST delivery through the Messages resource
//! - **Simulated**: dev-mode transport used when no credentials are configured
//!
//! Phone numbers are masked in every log line.

use std::sync::Arc;

use nb_core::services::SmsTransport;
use nb_shared::config::SmsProviderConfig;

pub mod simulated;
pub mod twilio;

pub use simulated::SimulatedSmsTransport;
pub use twilio::TwilioSmsTransport;

#[cfg(test)]
mod tests;

/// Select the SMS transport for this process
///
/// Live Twilio delivery when credentials are present, the simulated transport
/// otherwise. A client that cannot be built also falls back to simulation.
pub fn create_sms_transport(config: Option<&SmsProviderConfig>) -> Arc<dyn SmsTransport> {
    match config {
        Some(config) => match TwilioSmsTransport::new(config.clone()) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize Twilio SMS transport");
                tracing::warn!("Falling back to simulated SMS transport");
                Arc::new(SimulatedSmsTransport::new())
            }
        },
        None => {
            tracing::warn!(
                event = "dev_mode",
                channel = "sms",
                "Twilio credentials not configured, SMS deliveries will be simulated"
            );
            Arc::new(SimulatedSmsTransport::new())
        }
    }
}
