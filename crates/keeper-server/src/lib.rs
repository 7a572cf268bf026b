//! HTTP front end for Scene Keeper.
//!
//! - `GET /` and `GET /health` for liveness
//! - `POST /interactions` for Discord slash commands, behind Ed25519
//!   signature verification
//! - command registration for the `register` subcommand
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keeper_core::ResendMailer;
//! use keeper_discord::DiscordClient;
//! use keeper_server::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default().with_public_key("…hex…");
//!     let state = AppState::new(
//!         config,
//!         Arc::new(DiscordClient::new("bot-token")),
//!         Arc::new(ResendMailer::new("resend-key")),
//!     )?;
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod interaction;
pub mod register;
pub mod router;
pub mod signature;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::ServerConfig;
pub use error::{ApiError, Result};
pub use register::{parse_guild_ids, register_commands, RegisterReport};
pub use router::{create_router, serve};
pub use signature::InteractionVerifier;
pub use state::AppState;
