//! Message authoring, read receipts and delivery reporting

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use nb_shared::types::MessageResponse;

use crate::dto::{ComposeMessageRequest, ComposeMessageResponse};
use crate::handlers::{validate_body, ApiError};
use crate::middleware::AuthContext;
use crate::state::AppState;

/// POST /api/v1/messages
pub async fn compose(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<ComposeMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_body(&request.0)?;

    let input = request.into_inner().into_new_message(auth.user_id)?;
    let result = state.messages.compose(input).await?;

    Ok(HttpResponse::Created().json(ComposeMessageResponse {
        id: result.message.id,
        recipients: result.recipients,
    }))
}

/// POST /api/v1/messages/{id}/read
pub async fn mark_read(
    auth: AuthContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .messages
        .mark_read(path.into_inner(), auth.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Message marked as read")))
}

/// GET /api/v1/messages/{id}/delivery
pub async fn delivery_summary(
    _auth: AuthContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let summary = state.messages.delivery_summary(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
