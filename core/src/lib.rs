//! # Noticeboard Core
//!
//! Core business logic for the Noticeboard backend: domain entities, the
//! error taxonomy, repository and transport interfaces, and the services
//! that resolve audiences, fan messages out over delivery channels and run
//! phone verification.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
