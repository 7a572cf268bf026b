//! Slash-command definitions registered with Discord.
//!
//! See <https://discord.com/developers/docs/topics/permissions#permissions-bitwise-permission-flags>
//! for the permission bits.

use serde::{Deserialize, Serialize};

/// `MANAGE_CHANNELS`
pub const MANAGE_CHANNELS: u64 = 0x0000_0000_0000_0800;
/// `MANAGE_MESSAGES`
pub const MANAGE_MESSAGES: u64 = 0x0000_0000_0000_2000;
/// `MANAGE_THREADS`
pub const MANAGE_THREADS: u64 = 0x0000_0004_0000_0000;

/// Chat-input (slash) command type.
pub const CHAT_INPUT: u8 = 1;
/// String option type.
pub const OPTION_STRING: u8 = 3;

/// Name of the recipients option on the email commands.
pub const EMAIL_LIST_OPTION: &str = "email_list";

/// Command names the bot answers to.
pub mod names {
    pub const TEST: &str = "test";
    pub const CLEAN: &str = "clean";
    pub const TRANSCRIBE: &str = "transcribe";
    pub const ARCHIVE: &str = "archive";
}

/// An option on a slash command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// A slash command as sent to the bulk-overwrite endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationCommand {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    /// Permission bitfield serialized as a decimal string, as Discord expects.
    pub default_member_permissions: String,
}

impl ApplicationCommand {
    fn chat_input(name: &str, description: &str, permissions: u64) -> Self {
        Self {
            kind: CHAT_INPUT,
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
            default_member_permissions: permissions.to_string(),
        }
    }

    fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }
}

fn email_list_option() -> CommandOption {
    CommandOption {
        kind: OPTION_STRING,
        name: EMAIL_LIST_OPTION.to_string(),
        description: "Comma-separated list of email addresses to send the log to.".to_string(),
        required: true,
    }
}

/// Every command the bot registers.
pub fn command_list() -> Vec<ApplicationCommand> {
    let moderators = MANAGE_MESSAGES | MANAGE_THREADS;

    vec![
        ApplicationCommand::chat_input(
            names::TEST,
            "Check that Scene Keeper is online.",
            MANAGE_CHANNELS | moderators,
        ),
        ApplicationCommand::chat_input(
            names::CLEAN,
            "Clear all non-pinned messages from the channel.",
            moderators,
        ),
        ApplicationCommand::chat_input(
            names::TRANSCRIBE,
            "Email a transcription of this channel's messages.",
            moderators,
        )
        .with_option(email_list_option()),
        ApplicationCommand::chat_input(
            names::ARCHIVE,
            "Email an archive of this channel's messages.",
            moderators,
        )
        .with_option(email_list_option()),
    ]
}
