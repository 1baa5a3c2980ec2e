//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for the editor API. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes. [`DataError`] is the smaller
//! `{"error": ...}` envelope returned by the two data endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use linkcard_core::CoreError;
use linkcard_storage::StorageError;
use serde::Serialize;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Well-formed request that failed validation (422).
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::ValidationFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED")
            }
            ApiError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::ValidationFailed(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = ApiErrorDetail {
            code: code.to_string(),
            message: self.message(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::LinkIndexOutOfRange { .. } => ApiError::NotFound(err.to_string()),
            CoreError::MissingLinkField { .. } => ApiError::ValidationFailed(err.to_string()),
            CoreError::AuthenticationFailed | CoreError::NotAuthenticated => {
                ApiError::Unauthorized(err.to_string())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound => ApiError::NotFound(err.to_string()),
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}

/// Failure envelope of the fetch-all and upsert-all endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataError {
    Fetch,
    Save,
}

impl IntoResponse for DataError {
    fn into_response(self) -> Response {
        let message = match self {
            DataError::Fetch => "Failed to fetch data",
            DataError::Save => "Failed to save data",
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}
