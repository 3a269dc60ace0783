//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::{AuthError, ErrorKind};
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Every error kind maps to exactly one status and machine-readable code.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::UserExists => (StatusCode::CONFLICT, "USER_EXISTS"),
        ErrorKind::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        ErrorKind::InvalidPassword => (StatusCode::UNAUTHORIZED, "INVALID_PASSWORD"),
        ErrorKind::TokenMissing => (StatusCode::UNAUTHORIZED, "TOKEN_MISSING"),
        ErrorKind::TokenInvalid => (StatusCode::UNAUTHORIZED, "TOKEN_INVALID"),
        ErrorKind::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
        ErrorKind::TokenBlacklisted => (StatusCode::UNAUTHORIZED, "TOKEN_REVOKED"),
        ErrorKind::Unauthorized => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        ErrorKind::InternalFailure => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            ApiError::Auth(err) => {
                let (status, code) = status_for(err.kind());
                let message = if err.kind() == ErrorKind::InternalFailure {
                    tracing::error!("Internal error: {}", err);
                    "Internal server error".to_string()
                } else {
                    tracing::warn!("{}: {}", code, err);
                    err.to_string()
                };
                (status, code, message)
            }
        };

        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
