//! Channel operations for Scene Keeper.
//!
//! - **clean**: delete every non-pinned message in a channel
//! - **transcribe** / **archive**: email the full history with participant
//!   nicknames, then confirm in the channel
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use keeper_core::{ChannelKeeper, OperationContext, RequestingUser, ResendMailer};
//! use keeper_discord::DiscordClient;
//!
//! # async fn run() -> keeper_core::Result<()> {
//! let keeper = ChannelKeeper::new(
//!     Arc::new(DiscordClient::new("bot-token")),
//!     Arc::new(ResendMailer::new("resend-key")),
//! );
//! let ctx = OperationContext::new("123", "tavern", RequestingUser::new("42", "wren"));
//! let summary = keeper.clean(&ctx).await?;
//! println!("deleted {}/{}", summary.deleted, summary.requested);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod mailer;
pub mod operations;
pub mod report;

pub use context::{OperationContext, RequestingUser};
pub use error::{OperationError, Result};
pub use mailer::{Email, MailError, Mailer, ResendMailer, DEFAULT_FROM};
pub use operations::{ChannelKeeper, CleanSummary, TranscribeSummary};
pub use report::{ReportKind, Transcript};
