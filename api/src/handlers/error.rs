//! Mapping from domain failures to HTTP responses
//!
//! Request-level failures answer with a non-2xx status and an
//! [`ErrorResponse`] whose `error` field holds the human-readable message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use nb_core::errors::{DeliveryError, DomainError, VerificationError};
use nb_shared::errors::{error_codes, ErrorResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed or invalid request payload
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => error_codes::BAD_REQUEST,
            ApiError::Unauthorized(_) => error_codes::UNAUTHORIZED,
            ApiError::Domain(err) => match err {
                DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
                DomainError::NotFound { .. } => error_codes::NOT_FOUND,
                DomainError::Unauthorized => error_codes::UNAUTHORIZED,
                DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
                DomainError::Verification(v) => match v {
                    VerificationError::NotFound => error_codes::VERIFICATION_CODE_MISSING,
                    VerificationError::Expired => error_codes::VERIFICATION_CODE_EXPIRED,
                    VerificationError::Mismatch => error_codes::VERIFICATION_CODE_INVALID,
                    VerificationError::InvalidPhone => error_codes::PHONE_INVALID,
                    VerificationError::SmsDeliveryFailed { .. } => error_codes::SMS_ERROR,
                },
                DomainError::Delivery(DeliveryError::Configuration { .. }) => {
                    error_codes::INTERNAL_ERROR
                }
                DomainError::Delivery(_) => error_codes::SMS_ERROR,
            },
        }
    }

    /// Message shown to the client; internal details stay in the logs
    fn client_message(&self) -> String {
        match self {
            ApiError::Domain(DomainError::Internal { .. }) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Domain(err) => match err {
                DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
                DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                DomainError::Delivery(DeliveryError::Configuration { .. }) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut body = ErrorResponse::new(self.code(), self.client_message());
        if let ApiError::Domain(DomainError::NotFound { resource }) = self {
            body = body.add_detail("resource", resource);
        }

        HttpResponse::build(status).json(body)
    }
}
