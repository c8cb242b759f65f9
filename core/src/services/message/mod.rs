//! Message authoring service
//!
//! - `audience` - turns an audience descriptor into user ids
//! - `service` - compose, read receipts and delivery summaries

mod audience;
mod service;
mod types;


pub use audience::AudienceResolver;
pub use service::MessageService;
pub use types::ComposeResult;
