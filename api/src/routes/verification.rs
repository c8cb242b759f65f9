//! Phone verification endpoints for the authenticated caller

use actix_web::{web, HttpResponse};

use nb_shared::types::MessageResponse;

use crate::dto::{IssueCodeRequest, IssueCodeResponse, ValidateCodeRequest};
use crate::handlers::{validate_body, ApiError};
use crate::middleware::AuthContext;
use crate::state::AppState;

/// POST /api/v1/verification/issue
///
/// With a live SMS provider the code only travels by SMS. In dev mode it is
/// echoed back:
///
/// ```json
/// { "message": "Dev mode: Check console for code", "devMode": true, "code": "123456" }
/// ```
pub async fn issue_code(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<IssueCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_body(&request.0)?;

    let result = state
        .verification
        .issue_code(auth.user_id, &request.phone_number)
        .await?;

    let response = if result.dev_mode {
        IssueCodeResponse {
            message: "Dev mode: Check console for code".to_string(),
            dev_mode: Some(true),
            code: result.code,
        }
    } else {
        IssueCodeResponse {
            message: "Verification code sent".to_string(),
            dev_mode: None,
            code: None,
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/verification/validate
pub async fn validate_code(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<ValidateCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_body(&request.0)?;

    state
        .verification
        .validate_code(auth.user_id, request.code.trim())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Phone verified successfully")))
}
