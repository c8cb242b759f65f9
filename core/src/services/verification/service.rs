//! Main verification service implementation

use std::sync::Arc;

use chrono::Utc;
use tracing;
use uuid::Uuid;

use nb_shared::phone::{mask_phone_number, to_e164};

use crate::domain::entities::VerificationChallenge;
use crate::errors::{DomainResult, VerificationError};
use crate::repositories::{ChallengeRepository, ProfileRepository};
use crate::services::transport::SmsTransport;

use super::config::VerificationServiceConfig;
use super::types::IssueCodeResult;

/// Verification service for phone ownership challenges
pub struct VerificationService {
    /// SMS transport used to deliver codes
    sms: Arc<dyn SmsTransport>,
    /// Per-user challenge storage
    challenges: Arc<dyn ChallengeRepository>,
    /// Profiles updated on successful verification
    profiles: Arc<dyn ProfileRepository>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl VerificationService {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `sms` - SMS transport implementation
    /// * `challenges` - Challenge storage
    /// * `profiles` - Profile storage
    /// * `config` - Service configuration
    pub fn new(
        sms: Arc<dyn SmsTransport>,
        challenges: Arc<dyn ChallengeRepository>,
        profiles: Arc<dyn ProfileRepository>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            sms,
            challenges,
            profiles,
            config,
        }
    }

    /// Issue a verification code for a phone number
    ///
    /// This method:
    /// 1. Validates and normalizes the phone number to E.164
    /// 2. Generates a new code, replacing any previous challenge
    /// 3. Stores the challenge against the user
    /// 4. Sends the code via SMS
    ///
    /// The code is returned to the caller only when the SMS transport is
    /// simulated.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The authenticated user requesting verification
    /// * `phone` - The phone number to verify
    pub async fn issue_code(&self, user_id: Uuid, phone: &str) -> DomainResult<IssueCodeResult> {
        let phone = to_e164(phone).ok_or(VerificationError::InvalidPhone)?;

        let challenge = VerificationChallenge::issue(
            phone.clone(),
            Utc::now(),
            self.config.code_expiration_minutes,
        );
        self.challenges.store(user_id, challenge.clone()).await?;

        tracing::info!(
            user_id = %user_id,
            phone = %mask_phone_number(&phone),
            event = "otp_generated",
            "Generated new verification code"
        );

        let body = format!("Your verification code is: {}", challenge.code);
        let receipt = self.sms.send_sms(&phone, &body).await.map_err(|e| {
            tracing::error!(
                user_id = %user_id,
                phone = %mask_phone_number(&phone),
                error = %e,
                event = "otp_delivery_failed",
                "Failed to send verification code"
            );
            VerificationError::SmsDeliveryFailed {
                reason: e.to_string(),
            }
        })?;

        if receipt.simulated {
            tracing::info!(
                user_id = %user_id,
                event = "simulated_delivery",
                "Dev mode: verification code returned to caller"
            );
        }

        Ok(IssueCodeResult {
            dev_mode: receipt.simulated,
            code: receipt.simulated.then(|| challenge.code.clone()),
            expires_at: challenge.expires_at,
        })
    }

    /// Validate a submitted code against the user's live challenge
    ///
    /// A wrong code leaves the challenge in place so it can be retried until
    /// it expires. On success the challenge is cleared first, so the code is
    /// spent before the phone is marked verified. If the profile update then
    /// fails the challenge is put back and the error returned.
    pub async fn validate_code(&self, user_id: Uuid, code: &str) -> DomainResult<()> {
        let challenge = self
            .challenges
            .find(user_id)
            .await?
            .ok_or(VerificationError::NotFound)?;

        if challenge.is_expired_at(Utc::now()) {
            tracing::info!(user_id = %user_id, event = "otp_expired", "Verification code expired");
            return Err(VerificationError::Expired.into());
        }

        if !challenge.matches(code) {
            tracing::warn!(user_id = %user_id, event = "otp_mismatch", "Invalid verification code");
            return Err(VerificationError::Mismatch.into());
        }

        self.challenges.clear(user_id).await?;

        if let Err(e) = self
            .profiles
            .mark_phone_verified(user_id, &challenge.phone)
            .await
        {
            if let Err(restore) = self.challenges.store(user_id, challenge.clone()).await {
                tracing::error!(
                    user_id = %user_id,
                    error = %restore,
                    event = "otp_restore_failed",
                    "Failed to restore verification challenge"
                );
            }
            return Err(e);
        }

        tracing::info!(
            user_id = %user_id,
            phone = %mask_phone_number(&challenge.phone),
            event = "phone_verified",
            "Phone verified"
        );
        Ok(())
    }
}
