//! HTTP API for the Noticeboard backend
//!
//! Exposes message composition, SMS and push dispatch, phone verification
//! and push-token registration behind bearer authentication.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use handlers::ApiError;
pub use state::AppState;
