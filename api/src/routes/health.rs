use actix_web::{web, HttpResponse};

use nb_shared::types::{HealthResponse, HealthStatus};

use crate::state::AppState;

/// GET /health
///
/// Reports `degraded` while any channel runs on a simulated transport and
/// `unhealthy` when the database does not answer.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let simulated = state
        .simulated_channels()
        .into_iter()
        .map(|c| c.to_string())
        .collect();
    let mut health =
        HealthResponse::healthy(env!("CARGO_PKG_VERSION")).with_simulated_channels(simulated);

    if let Some(database) = &state.database {
        let reachable = match database.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        };
        if !reachable {
            health.status = HealthStatus::Unhealthy;
            return HttpResponse::ServiceUnavailable().json(health);
        }
    }

    HttpResponse::Ok().json(health)
}
