//! Simulated SMS transport for development
//!
//! Nothing leaves the process. Every send succeeds and is reported through
//! `tracing` so the text can be read off the console.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use nb_core::errors::DeliveryError;
use nb_core::services::{DeliveryReceipt, SmsTransport};
use nb_shared::utils::phone::mask_phone_number;

#[derive(Debug, Default)]
pub struct SimulatedSmsTransport {
    message_count: AtomicU64,
}

impl SimulatedSmsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages "sent" so far
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsTransport for SimulatedSmsTransport {
    async fn send_sms(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            event = "simulated_delivery",
            channel = "sms",
            to = %mask_phone_number(to),
            count,
            "SMS simulated, no provider configured"
        );
        debug!(body = %body, "Simulated SMS body");

        Ok(DeliveryReceipt::simulated())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
