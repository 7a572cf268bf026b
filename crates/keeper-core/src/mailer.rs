//! Outbound email delivery.
//!
//! Transcripts go out through the Resend HTTP API. The [`Mailer`] trait lets
//! the orchestrators run against a recording mailer in tests.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Sender identity used when none is configured.
pub const DEFAULT_FROM: &str = "Scene Keeper Bot <bot@scenekeeper.xyz>";

/// Resend API base URL.
pub const RESEND_API_BASE: &str = "https://api.resend.com";

/// Errors that can occur while delivering an email.
#[derive(Error, Debug)]
pub enum MailError {
    /// No API key configured.
    #[error("mail API key not set")]
    NoApiKey,

    /// The request never got a response.
    #[error("mail request failed: {0}")]
    RequestFailed(String),

    /// The provider answered with an error.
    #[error("mail provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result type alias for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// One outgoing message with both a plain text and an HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Something that can deliver an [`Email`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

/// [`Mailer`] backed by the Resend API.
#[derive(Clone)]
pub struct ResendMailer {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: RESEND_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the mailer at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.base_url)
    }
}

/// Pulls the human-readable message out of a Resend error body.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(MailError::NoApiKey);
        }

        debug!(to = ?email.to, subject = %email.subject, "sending email");

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(email)
            .send()
            .await
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        let id = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| json["id"].as_str().map(str::to_string));
        info!(id = ?id, recipients = email.to.len(), "email accepted");
        Ok(())
    }
}
