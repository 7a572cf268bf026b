//! Discord REST plumbing for Scene Keeper.
//!
//! - **transport**: cloneable request descriptions and the reqwest transport
//! - **rate_limit**: bounded retry-on-429 with `retry_after` backoff
//! - **api**: the typed endpoints the bot calls ([`DiscordApi`])
//! - **collector**: backward pagination over channel history
//! - **participants**: distinct authors plus guild nicknames
//! - **commands**: slash-command definitions for registration
//!
//! # Example
//!
//! ```no_run
//! use keeper_discord::{collect_messages, CollectOptions, DiscordClient};
//!
//! # async fn run() -> keeper_discord::Result<()> {
//! let client = DiscordClient::new("bot-token");
//! let history = collect_messages(&client, "123", CollectOptions::default(), |m| !m.pinned).await?;
//! println!("{} unpinned messages", history.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod collector;
pub mod commands;
pub mod error;
pub mod participants;
pub mod rate_limit;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::{DiscordApi, DiscordClient};
pub use collector::{
    collect_message_ids, collect_messages, CollectOptions, Collection, MAX_PAGE_SIZE,
};
pub use commands::{command_list, ApplicationCommand, CommandOption};
pub use error::{DiscordError, Result};
pub use participants::{resolve_participants, unique_authors};
pub use rate_limit::{retry_after, RateLimitedClient, DEFAULT_MAX_RETRIES};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::{Author, Guild, GuildMember, Message, Participant};
