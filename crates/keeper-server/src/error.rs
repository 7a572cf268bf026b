//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error answered synchronously to Discord.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or empty request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid request signature.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}
