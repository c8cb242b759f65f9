//! Verification challenge entity for phone ownership proofs.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a challenge (10 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 10;

/// Code, expiry and pending phone number held against a user
///
/// At most one challenge exists per user; issuing a new one replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationChallenge {
    /// The 6-digit code, leading zeros preserved
    pub code: String,

    /// Absolute expiry timestamp
    pub expires_at: DateTime<Utc>,

    /// Phone number awaiting verification (E.164)
    pub phone: String,
}

impl VerificationChallenge {
    /// Creates a challenge with a fresh random code
    ///
    /// # Arguments
    ///
    /// * `phone` - The phone number the code will be sent to
    /// * `issued_at` - Issue time; expiry is this plus `lifetime_minutes`
    /// * `lifetime_minutes` - Minutes until the code expires
    pub fn issue(phone: String, issued_at: DateTime<Utc>, lifetime_minutes: i64) -> Self {
        Self {
            code: Self::generate_code(),
            expires_at: issued_at + Duration::minutes(lifetime_minutes),
            phone,
        }
    }

    /// Generates a uniformly random 6-digit code using the OS RNG
    fn generate_code() -> String {
        let code: u32 = OsRng.gen_range(0..1_000_000);
        format!("{:0width$}", code, width = CODE_LENGTH)
    }

    /// Checks whether the challenge has expired at `now`
    ///
    /// The expiry instant itself is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Compares a submitted code with the stored one
    ///
    /// Plain equality; this is not a constant-time comparison.
    pub fn matches(&self, submitted: &str) -> bool {
        self.code == submitted
    }
}
