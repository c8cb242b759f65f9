//! Type definitions shared by the HTTP surface
//!
//! - `response` - Plain message envelopes and health checks

pub mod response;

pub use response::{HealthResponse, HealthStatus, MessageResponse};
