//! Error types for channel operations.

use thiserror::Error;

use crate::mailer::MailError;

/// Why a clean or transcribe run stopped.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The interaction did not come from a guild channel.
    #[error("operation requires a guild channel")]
    MissingGuild,

    /// Nobody to send the transcript to.
    #[error("no email recipients provided")]
    NoRecipients,

    /// A Discord request failed (history, guild or member lookup).
    #[error("Discord error: {0}")]
    Discord(#[from] keeper_discord::DiscordError),

    /// The transcript email could not be delivered.
    #[error("delivery error: {0}")]
    Delivery(#[from] MailError),
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, OperationError>;
