//! Slash-command registration.
//!
//! Overwrites the command set in each development guild (visible at once)
//! and then globally (may take a while to propagate).

use tracing::{error, info};

use keeper_discord::{command_list, DiscordApi};

/// Where commands were installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterReport {
    /// Guild ids that accepted the overwrite.
    pub guilds: Vec<String>,
    pub global: bool,
    /// `(target, error)` for each failed overwrite; `target` is a guild id
    /// or `"global"`.
    pub failures: Vec<(String, String)>,
}

impl RegisterReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits `DEV_GUILD_IDS`, dropping blanks.
pub fn parse_guild_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Installs every command in each guild, then globally.
///
/// A failing target is logged and recorded; the remaining targets still run.
pub async fn register_commands<A>(
    api: &A,
    application_id: &str,
    guild_ids: &[String],
) -> RegisterReport
where
    A: DiscordApi + ?Sized,
{
    let commands = command_list();
    let mut report = RegisterReport::default();

    for guild_id in guild_ids {
        info!(guild_id = %guild_id, "registering guild commands");
        match api
            .bulk_overwrite_guild_commands(application_id, guild_id, &commands)
            .await
        {
            Ok(()) => {
                info!(guild_id = %guild_id, "finished installing guild commands");
                report.guilds.push(guild_id.clone());
            }
            Err(e) => {
                error!(guild_id = %guild_id, error = %e, "guild command registration failed");
                report.failures.push((guild_id.clone(), e.to_string()));
            }
        }
    }

    match api
        .bulk_overwrite_global_commands(application_id, &commands)
        .await
    {
        Ok(()) => {
            info!(count = commands.len(), "finished installing global commands");
            report.global = true;
        }
        Err(e) => {
            error!(error = %e, "global command registration failed");
            report.failures.push(("global".to_string(), e.to_string()));
        }
    }

    report
}
