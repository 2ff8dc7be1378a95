// src/web/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::ArenaError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: &'static str,
}

impl ApiError {
    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: "bad_request",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ArenaError> for ApiError {
    fn from(err: ArenaError) -> Self {
        let status_code = match &err {
            ArenaError::NoSuchSession(_) | ArenaError::UnknownModel(_) => StatusCode::NOT_FOUND,
            ArenaError::SessionClosed(_) => StatusCode::GONE,
            ArenaError::InvalidMove(_) => StatusCode::BAD_REQUEST,
            ArenaError::Protocol(_) => StatusCode::BAD_GATEWAY,
            ArenaError::Spawn { .. } | ArenaError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status_code.is_server_error() {
            error!(kind = err.kind(), error = %err, "Request failed");
        }
        Self {
            message: err.to_string(),
            status_code,
            error_code: err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error_code,
            "message": self.message,
        });
        (self.status_code, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
