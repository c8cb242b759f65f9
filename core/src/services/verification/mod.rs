//! Phone verification service
//!
//! This module provides the one-time-code workflow:
//! - Code generation and storage against the requesting user
//! - Code delivery through the SMS transport
//! - Validation with expiry, then marking the profile's phone as verified

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use types::IssueCodeResult;
