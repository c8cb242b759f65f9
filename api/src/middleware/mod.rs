pub mod auth;
pub mod cors;

pub use auth::{AuthContext, Claims, JwtAuth, TokenVerifier};
pub use cors::create_cors;
