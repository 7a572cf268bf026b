//! Discord resources as this bot sees them.
//!
//! These mirror the subset of the Discord v10 payloads the bot actually reads.
//! Unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    /// Snowflake id, the identity key.
    pub id: String,
    /// Account username (not the guild nickname).
    pub username: String,
    /// Set for bot accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

/// A channel message snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Snowflake id; chronologically sortable.
    pub id: String,
    /// Discord message type (0 = default, 19 = reply, ...).
    #[serde(rename = "type", default)]
    pub kind: u32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Text content. Empty for attachment-only messages.
    #[serde(default)]
    pub content: String,
    /// Who wrote it.
    pub author: Author,
    /// Whether the message is pinned in its channel.
    #[serde(default)]
    pub pinned: bool,
}

/// A distinct author within a collected message set, with their guild nickname.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub nickname: Option<String>,
}

impl Participant {
    /// Participant with no nickname resolved yet.
    pub fn from_author(author: &Author) -> Self {
        Self {
            id: author.id.clone(),
            username: author.username.clone(),
            nickname: None,
        }
    }

    /// `username (nickname)` or just `username`.
    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(nick) => format!("{} ({})", self.username, nick),
            None => self.username.clone(),
        }
    }
}

/// Guild metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guild {
    pub id: String,
    pub name: String,
}

/// User embedded in a guild member payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberUser {
    pub id: String,
    pub username: String,
}

/// Guild member lookup result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildMember {
    #[serde(default)]
    pub user: Option<MemberUser>,
    /// Guild-specific nickname, if the member set one.
    #[serde(default)]
    pub nick: Option<String>,
}

impl GuildMember {
    /// Nickname with empty strings treated as absent.
    pub fn nickname(&self) -> Option<String> {
        self.nick.as_ref().filter(|n| !n.is_empty()).cloned()
    }
}

/// Body of a create-message request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage {
    pub content: String,
}
