//! Scene Keeper entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use keeper_core::ResendMailer;
use keeper_discord::DiscordClient;
use keeper_server::cli::{Cli, Commands, RegisterArgs, ServeArgs};
use keeper_server::{parse_guild_ids, register_commands, serve, AppState};

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // .env.local wins over .env; neither overrides the real environment.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt().with_env_filter(filter).with_target(false).init();

    let token = cli
        .discord_token
        .filter(|t| !t.is_empty())
        .ok_or("DISCORD_TOKEN is not set")?;

    match cli.command {
        Commands::Serve(args) => run_serve(token, args).await,
        Commands::Register(args) => run_register(token, args).await,
    }
}

async fn run_serve(token: String, args: ServeArgs) -> Result<(), BoxError> {
    if args.public_key.is_none() {
        warn!("PUBLIC_KEY is not set; every interaction will be rejected");
    }
    let resend_key = args.resend_api_key.clone().unwrap_or_default();
    if resend_key.is_empty() {
        warn!("RESEND_API_KEY is not set; transcript emails will fail");
    }

    let mut state = AppState::new(
        args.config(),
        Arc::new(DiscordClient::new(token)),
        Arc::new(ResendMailer::new(resend_key)),
    )?;
    if let Some(from) = args.email_from {
        state = state.with_email_from(from);
    }

    serve(state).await?;
    Ok(())
}

async fn run_register(token: String, args: RegisterArgs) -> Result<(), BoxError> {
    let app_id = args
        .app_id
        .filter(|id| !id.is_empty())
        .ok_or("APP_ID is not set")?;
    let guild_ids = parse_guild_ids(&args.dev_guild_ids);

    let client = DiscordClient::new(token);
    let report = register_commands(&client, &app_id, &guild_ids).await;

    if !report.is_success() {
        return Err(format!(
            "{} of {} registration targets failed",
            report.failures.len(),
            guild_ids.len() + 1
        )
        .into());
    }

    info!(guilds = report.guilds.len(), "commands registered");
    Ok(())
}
