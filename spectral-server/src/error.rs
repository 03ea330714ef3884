//! Error types for spectral-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use spectral_common::kernel::KernelError;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Invalid form field (400), reported with the field name
    #[error("Invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    /// No valid login session (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The kernel failed or answered with something unusable (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// spectral-common error
    #[error("Common error: {0}")]
    Common(#[from] spectral_common::Error),
}

impl ApiError {
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

impl From<KernelError> for ApiError {
    fn from(err: KernelError) -> Self {
        ApiError::BadGateway(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Common(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::InvalidField {
                field: name,
                message,
            } => {
                field = Some(name);
                (StatusCode::BAD_REQUEST, "INVALID_FIELD", message)
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "KERNEL_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(err) => common_error_parts(err),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let body = match field {
            Some(field) => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "field": field,
                }
            }),
            None => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

fn common_error_parts(err: spectral_common::Error) -> (StatusCode, &'static str, String) {
    use spectral_common::Error;

    match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        Error::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
        Error::Kernel(e) => (StatusCode::BAD_GATEWAY, "KERNEL_ERROR", e.to_string()),
        Error::Database(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            e.to_string(),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "COMMON_ERROR",
            other.to_string(),
        ),
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
