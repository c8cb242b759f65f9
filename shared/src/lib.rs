//! Shared configuration, response envelopes and phone utilities

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, DispatchConfig, Environment, LogFormat, LoggingConfig,
    PushProviderConfig, ServerConfig, SmsProviderConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, HealthStatus, MessageResponse};
pub use utils::phone;
