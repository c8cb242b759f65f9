//! Business services containing domain logic and use cases.

pub mod delivery;
pub mod dispatch;
pub mod message;
pub mod token_lifecycle;
pub mod transport;
pub mod verification;

// Re-export commonly used types
pub use delivery::{reduce_status, DeliveryLogWriter, RecipientStatusUpdater};
pub use dispatch::{DispatchService, DispatchServiceConfig};
pub use message::{AudienceResolver, ComposeResult, MessageService};
pub use token_lifecycle::TokenLifecycleManager;
pub use transport::{
    compose_sms_body, DeliveryReceipt, EmailTransport, PushNotification, PushTransport,
    SmsTransport,
};
pub use verification::{IssueCodeResult, VerificationService, VerificationServiceConfig};
