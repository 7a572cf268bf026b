//! Interaction payloads received from Discord and the replies sent back.
//!
//! Only the fields the bot reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use keeper_core::{OperationContext, RequestingUser};

/// `InteractionType::PING`
pub const PING: u8 = 1;
/// `InteractionType::APPLICATION_COMMAND`
pub const APPLICATION_COMMAND: u8 = 2;

/// `InteractionCallbackType::PONG`
pub const PONG: u8 = 1;
/// `InteractionCallbackType::CHANNEL_MESSAGE_WITH_SOURCE`
pub const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Present for guild invocations.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM invocations.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub channel: Option<Channel>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Interaction {
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.name.as_str())
    }

    /// String value of a named command option.
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|o| o.name == name)?
            .value
            .as_ref()?
            .as_str()
    }

    /// The invoking user, from `member.user` in guilds or `user` in DMs.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Name used in acknowledgements.
    pub fn invoker_name(&self) -> &str {
        self.invoker().map_or("unknown", |u| u.username.as_str())
    }

    /// Operation context, if the payload names both a channel and a user.
    pub fn context(&self) -> Option<OperationContext> {
        let user = self.invoker()?;
        let (channel_id, channel_name) = match (&self.channel, &self.channel_id) {
            (Some(channel), _) => (channel.id.clone(), channel.name.clone()),
            (None, Some(id)) => (id.clone(), None),
            (None, None) => return None,
        };

        let mut ctx = OperationContext::new(
            channel_id.clone(),
            channel_name.unwrap_or(channel_id),
            RequestingUser::new(user.id.clone(), user.username.clone()),
        );
        if let Some(guild_id) = &self.guild_id {
            ctx = ctx.with_guild(guild_id.clone());
        }
        Some(ctx)
    }
}

/// Splits a comma-separated recipient list, trimming blanks.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Synchronous reply to an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub content: String,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: PONG,
            data: None,
        }
    }

    /// A channel message shown in reply to the command.
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(ResponseData {
                content: content.into(),
            }),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.content.as_str())
    }
}
