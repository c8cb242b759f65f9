//! Domain entities representing core business objects.

pub mod delivery_log;
pub mod message;
pub mod profile;
pub mod push_token;
pub mod recipient;
pub mod verification_challenge;

// Re-export commonly used types
pub use delivery_log::{DeliveryLogEntry, DeliveryStatus, SIMULATED_DELIVERY_NOTE};
pub use message::{AudienceType, Message, NewMessage};
pub use profile::{Profile, Role};
pub use push_token::PushToken;
pub use recipient::{Recipient, RecipientStatus};
pub use verification_challenge::{
    VerificationChallenge, CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES,
};
