//! CORS configuration
//!
//! Origins come from `CORS_ALLOWED_ORIGINS`; `*` allows any origin, which is
//! the development default.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use nb_shared::config::ServerConfig;

const MAX_AGE_SECS: usize = 3600;

pub fn create_cors(config: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(MAX_AGE_SECS);

    if config.allows_any_origin() {
        tracing::debug!("CORS allows any origin");
        return cors.allow_any_origin();
    }

    config.allowed_origins.iter().fold(cors, |cors, origin| {
        tracing::info!(origin = %origin, "Adding allowed origin");
        cors.allowed_origin(origin)
    })
}
