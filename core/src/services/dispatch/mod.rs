//! Dispatch orchestrator
//!
//! Resolves the candidate recipients of a message for one channel, looks up
//! each recipient's destination, drives the channel transport and records
//! the outcome in the delivery log before refreshing the recipient's
//! aggregate status.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::DispatchServiceConfig;
pub use service::DispatchService;
