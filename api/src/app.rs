//! Application factory
//!
//! Builds the actix `App` shared by the binary and the HTTP tests.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use tracing_actix_web::TracingLogger;

use nb_shared::config::AppConfig;

use crate::handlers::ApiError;
use crate::middleware::create_cors;
use crate::routes;
use crate::state::AppState;

/// Create the application with all routes and middleware
pub fn create_app(
    state: web::Data<AppState>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());
    let path_config = web::PathConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

    App::new()
        .app_data(state)
        .app_data(json_config)
        .app_data(path_config)
        .wrap(create_cors(&config.server))
        .wrap(TracingLogger::default())
        .configure(routes::configure(&config.auth))
}
