use actix_web::{web, HttpResponse};

use crate::dto::{RegisterPushTokenRequest, RegisterPushTokenResponse};
use crate::handlers::{validate_body, ApiError};
use crate::middleware::AuthContext;
use crate::state::AppState;

/// POST /api/v1/push-tokens
///
/// Registering the same token twice is not an error.
pub async fn register(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<RegisterPushTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_body(&request.0)?;

    let registered = state
        .tokens
        .register(auth.user_id, request.token.trim())
        .await?;

    Ok(HttpResponse::Ok().json(RegisterPushTokenResponse { registered }))
}
