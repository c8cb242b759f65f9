//! Simulated push transport for development

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use nb_core::errors::DeliveryError;
use nb_core::services::{DeliveryReceipt, PushNotification, PushTransport};

use super::token_hint;

#[derive(Debug, Default)]
pub struct SimulatedPushTransport {
    message_count: AtomicU64,
}

impl SimulatedPushTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for SimulatedPushTransport {
    async fn send_push(
        &self,
        token: &str,
        notification: &PushNotification,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        self.message_count.fetch_add(1, Ordering::SeqCst);

        info!(
            event = "simulated_delivery",
            channel = "push",
            token = %token_hint(token),
            message_id = %notification.message_id,
            title = %notification.title,
            "Push simulated, no provider configured"
        );

        Ok(DeliveryReceipt::simulated())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
