//! Dispatch entry points, invoked after a message and its recipients exist

use actix_web::{web, HttpResponse};

use nb_core::domain::value_objects::Channel;

use crate::dto::{DispatchRequest, DispatchResponse};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;
use crate::state::AppState;

/// POST /api/v1/dispatch/sms
pub async fn dispatch_sms(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<DispatchRequest>,
) -> Result<HttpResponse, ApiError> {
    run(auth, &state, request.message_id, Channel::Sms).await
}

/// POST /api/v1/dispatch/push
pub async fn dispatch_push(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<DispatchRequest>,
) -> Result<HttpResponse, ApiError> {
    run(auth, &state, request.message_id, Channel::Push).await
}

async fn run(
    auth: AuthContext,
    state: &AppState,
    message_id: uuid::Uuid,
    channel: Channel,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(
        caller = %auth.user_id,
        message_id = %message_id,
        channel = %channel,
        "Dispatch requested"
    );

    let summary = state.dispatch.dispatch(message_id, channel).await?;
    let message = match channel {
        Channel::Sms => "SMS delivery processed",
        Channel::Push => "Push notification delivery processed",
        Channel::Email => "Email delivery processed",
    };

    Ok(HttpResponse::Ok().json(DispatchResponse::new(message, summary)))
}
