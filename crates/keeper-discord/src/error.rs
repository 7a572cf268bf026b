//! Error types for the Discord client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the Discord REST API.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Discord answered with a non-success status.
    #[error("{route} failed with {status}: {body}")]
    Status {
        /// Status code returned by Discord.
        status: StatusCode,
        /// Route that was requested, e.g. `channels/123/messages`.
        route: String,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiscordError {
    /// Returns the HTTP status if Discord answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DiscordError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the error is a 429 that outlived its retry budget.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

impl From<reqwest::Error> for DiscordError {
    fn from(e: reqwest::Error) -> Self {
        DiscordError::Http(e.to_string())
    }
}

/// Result type for Discord operations.
pub type Result<T> = std::result::Result<T, DiscordError>;
