//! Value objects shared across services

pub mod channel;
pub mod delivery_summary;

pub use channel::Channel;
pub use delivery_summary::{DeliverySummary, DispatchSummary, StatusCounts};
