//! Request and response bodies for the HTTP API
//!
//! All bodies use camelCase field names on the wire.

pub mod dispatch;
pub mod message;
pub mod push_token;
pub mod verification;

pub use dispatch::{DispatchRequest, DispatchResponse};
pub use message::{ComposeMessageRequest, ComposeMessageResponse};
pub use push_token::{RegisterPushTokenRequest, RegisterPushTokenResponse};
pub use verification::{IssueCodeRequest, IssueCodeResponse, ValidateCodeRequest};
