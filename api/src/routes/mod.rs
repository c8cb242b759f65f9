//! Route table
//!
//! Everything under `/api/v1` requires a bearer credential; `/health` does not.

pub mod dispatch;
pub mod health;
pub mod messages;
pub mod push_tokens;
pub mod verification;

use actix_web::web;

use nb_shared::config::AuthConfig;

use crate::middleware::JwtAuth;

pub fn configure(auth: &AuthConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    let jwt = JwtAuth::new(auth);

    move |cfg: &mut web::ServiceConfig| {
        cfg.route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/api/v1")
                    .wrap(jwt)
                    .service(
                        web::scope("/dispatch")
                            .route("/sms", web::post().to(dispatch::dispatch_sms))
                            .route("/push", web::post().to(dispatch::dispatch_push)),
                    )
                    .service(
                        web::scope("/verification")
                            .route("/issue", web::post().to(verification::issue_code))
                            .route("/validate", web::post().to(verification::validate_code)),
                    )
                    .service(
                        web::scope("/messages")
                            .route("", web::post().to(messages::compose))
                            .route("/{id}/read", web::post().to(messages::mark_read))
                            .route("/{id}/delivery", web::get().to(messages::delivery_summary)),
                    )
                    .route("/push-tokens", web::post().to(push_tokens::register)),
            );
    }
}
