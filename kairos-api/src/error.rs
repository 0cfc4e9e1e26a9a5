//! Error types for kairos-api
//!
//! Every error reaches the client as `{"error": {"code": ..., "message": ...}}`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{GeminiError, ShoppingError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Multipart body could not be read (400, or 413 when over the size limit)
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Required form field absent (422)
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    /// External model or shopping service failed (500)
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Service not configured for the requested operation (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => ApiError::Config(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ShoppingError> for ApiError {
    fn from(err: ShoppingError) -> Self {
        match err {
            ShoppingError::MissingApiKey => ApiError::Config(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<kairos_common::Error> for ApiError {
    fn from(err: kairos_common::Error) -> Self {
        match err {
            kairos_common::Error::Io(e) => ApiError::Io(e),
            kairos_common::Error::Config(msg) => ApiError::Config(msg),
            kairos_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Multipart(ref err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, err.body_text())
            }
            ApiError::MissingField(field) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MISSING_FIELD",
                format!("Form field '{}' is required", field),
            ),
            ApiError::Upstream(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", msg)
            }
            ApiError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
