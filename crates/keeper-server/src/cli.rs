//! Command-line interface definition using clap.
//!
//! Every option can also come from the environment (or a `.env` file), which
//! is how the bot is normally deployed.

use std::num::NonZeroUsize;

use clap::{Args, Parser, Subcommand};

use crate::config::ServerConfig;

/// Scene Keeper - Discord channel cleaner and transcriber
#[derive(Parser, Debug)]
#[command(name = "scene-keeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Bot token used for every Discord API call
    #[arg(long, env = "DISCORD_TOKEN", global = true, hide_env_values = true)]
    pub discord_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactions endpoint
    Serve(ServeArgs),

    /// Install the slash commands in the dev guilds and globally
    Register(RegisterArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Application public key (hex) used to verify interactions
    #[arg(long, env = "PUBLIC_KEY")]
    pub public_key: Option<String>,

    /// Resend API key for transcript emails
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    /// Sender identity for transcript emails
    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Stop history walks after this many pages of 100 messages (at least 1)
    #[arg(long, env = "KEEPER_MAX_PAGES")]
    pub max_pages: Option<NonZeroUsize>,
}

impl ServeArgs {
    /// Server configuration from these arguments.
    pub fn config(&self) -> ServerConfig {
        let config = ServerConfig::new(self.host.clone(), self.port)
            .with_max_pages(self.max_pages.map(NonZeroUsize::get));
        match &self.public_key {
            Some(key) => config.with_public_key(key.clone()),
            None => config,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Application id
    #[arg(long, env = "APP_ID")]
    pub app_id: Option<String>,

    /// Comma-separated guild ids that get the commands immediately
    #[arg(long, env = "DEV_GUILD_IDS", default_value = "")]
    pub dev_guild_ids: String,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
