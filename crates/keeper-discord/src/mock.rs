//! In-memory [`DiscordApi`] for tests.
//!
//! Behaves like a tiny Discord: messages live in per-channel lists, paging
//! honours `limit`/`before` the way the real endpoint does, deletes remove
//! messages, and every call is recorded for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;

use crate::api::DiscordApi;
use crate::commands::ApplicationCommand;
use crate::error::{DiscordError, Result};
use crate::types::{Author, Guild, GuildMember, Message};

/// Builds a message whose id doubles as its chronological position.
pub fn message(id: u64, author_id: &str, username: &str, unix_secs: i64, pinned: bool) -> Message {
    Message {
        id: id.to_string(),
        kind: 0,
        timestamp: Utc
            .timestamp_opt(unix_secs, 0)
            .single()
            .unwrap_or_default(),
        content: format!("message {}", id),
        author: Author {
            id: author_id.to_string(),
            username: username.to_string(),
            bot: None,
        },
        pinned,
    }
}

/// One recorded `list_messages` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCall {
    pub channel_id: String,
    pub limit: usize,
    pub before: Option<String>,
    /// Number of messages returned.
    pub returned: usize,
}

/// One recorded `delete_message` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCall {
    pub channel_id: String,
    pub message_id: String,
    pub audit_reason: String,
}

/// One recorded command overwrite; `guild_id` is `None` for global.
#[derive(Debug, Clone, PartialEq)]
pub struct OverwriteCall {
    pub application_id: String,
    pub guild_id: Option<String>,
    pub command_names: Vec<String>,
}

#[derive(Default)]
struct Recorded {
    lists: Vec<ListCall>,
    deletes: Vec<DeleteCall>,
    posts: Vec<(String, String)>,
    member_lookups: Vec<String>,
    overwrites: Vec<OverwriteCall>,
}

/// In-memory Discord.
#[derive(Default)]
pub struct MockDiscord {
    channels: Mutex<HashMap<String, Vec<Message>>>,
    guilds: HashMap<String, String>,
    members: HashMap<(String, String), Option<String>>,
    fail_list_after: Option<usize>,
    failing_deletes: HashSet<String>,
    failing_guild_overwrites: HashSet<String>,
    fail_posts: bool,
    recorded: Mutex<Recorded>,
}

fn status_error(status: StatusCode, route: String) -> DiscordError {
    DiscordError::Status {
        status,
        route,
        body: String::new(),
    }
}

impl MockDiscord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a channel. Order does not matter.
    pub fn with_messages(self, channel_id: &str, messages: Vec<Message>) -> Self {
        self.channels
            .lock()
            .unwrap()
            .insert(channel_id.to_string(), messages);
        self
    }

    pub fn with_guild(mut self, guild_id: &str, name: &str) -> Self {
        self.guilds.insert(guild_id.to_string(), name.to_string());
        self
    }

    /// Registers a guild member. Unregistered users answer 404.
    pub fn with_member(mut self, guild_id: &str, user_id: &str, nick: Option<&str>) -> Self {
        self.members.insert(
            (guild_id.to_string(), user_id.to_string()),
            nick.map(str::to_string),
        );
        self
    }

    /// Every `list_messages` call after the first `n` fails with 500.
    pub fn fail_list_after(mut self, n: usize) -> Self {
        self.fail_list_after = Some(n);
        self
    }

    /// Deleting this message id fails with 403.
    pub fn fail_delete_of(mut self, message_id: &str) -> Self {
        self.failing_deletes.insert(message_id.to_string());
        self
    }

    /// Overwriting commands in this guild fails with 403.
    pub fn fail_overwrite_in(mut self, guild_id: &str) -> Self {
        self.failing_guild_overwrites.insert(guild_id.to_string());
        self
    }

    /// Posting messages fails with 403.
    pub fn fail_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.recorded.lock().unwrap().lists.clone()
    }

    /// Sizes of the pages served, in order.
    pub fn page_sizes(&self) -> Vec<usize> {
        self.list_calls().iter().map(|c| c.returned).collect()
    }

    pub fn deletes(&self) -> Vec<DeleteCall> {
        self.recorded.lock().unwrap().deletes.clone()
    }

    /// `(channel_id, content)` of every posted message.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.recorded.lock().unwrap().posts.clone()
    }

    /// User ids looked up, in order.
    pub fn member_lookups(&self) -> Vec<String> {
        self.recorded.lock().unwrap().member_lookups.clone()
    }

    pub fn overwrites(&self) -> Vec<OverwriteCall> {
        self.recorded.lock().unwrap().overwrites.clone()
    }

    /// Messages still present in a channel.
    pub fn remaining(&self, channel_id: &str) -> Vec<Message> {
        self.channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn snowflake(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}

#[async_trait]
impl DiscordApi for MockDiscord {
    async fn list_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>> {
        let mut recorded = self.recorded.lock().unwrap();
        let route = format!("channels/{}/messages", channel_id);

        if let Some(n) = self.fail_list_after {
            if recorded.lists.len() >= n {
                recorded.lists.push(ListCall {
                    channel_id: channel_id.to_string(),
                    limit,
                    before: before.map(str::to_string),
                    returned: 0,
                });
                return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR, route));
            }
        }

        let mut page: Vec<Message> = self
            .channels
            .lock()
            .unwrap()
            .get(channel_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|m| before.map_or(true, |b| snowflake(&m.id) < snowflake(b)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        page.sort_by_key(|m| std::cmp::Reverse(snowflake(&m.id)));
        page.truncate(limit);

        recorded.lists.push(ListCall {
            channel_id: channel_id.to_string(),
            limit,
            before: before.map(str::to_string),
            returned: page.len(),
        });
        Ok(page)
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
        audit_reason: &str,
    ) -> Result<()> {
        self.recorded.lock().unwrap().deletes.push(DeleteCall {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            audit_reason: audit_reason.to_string(),
        });

        if self.failing_deletes.contains(message_id) {
            return Err(status_error(
                StatusCode::FORBIDDEN,
                format!("channels/{}/messages/{}", channel_id, message_id),
            ));
        }

        if let Some(messages) = self.channels.lock().unwrap().get_mut(channel_id) {
            messages.retain(|m| m.id != message_id);
        }
        Ok(())
    }

    async fn get_guild(&self, guild_id: &str) -> Result<Guild> {
        self.guilds
            .get(guild_id)
            .map(|name| Guild {
                id: guild_id.to_string(),
                name: name.clone(),
            })
            .ok_or_else(|| status_error(StatusCode::NOT_FOUND, format!("guilds/{}", guild_id)))
    }

    async fn get_guild_member(&self, guild_id: &str, user_id: &str) -> Result<GuildMember> {
        self.recorded
            .lock()
            .unwrap()
            .member_lookups
            .push(user_id.to_string());

        self.members
            .get(&(guild_id.to_string(), user_id.to_string()))
            .map(|nick| GuildMember {
                user: None,
                nick: nick.clone(),
            })
            .ok_or_else(|| {
                status_error(
                    StatusCode::NOT_FOUND,
                    format!("guilds/{}/members/{}", guild_id, user_id),
                )
            })
    }

    async fn create_message(&self, channel_id: &str, content: &str) -> Result<()> {
        if self.fail_posts {
            return Err(status_error(
                StatusCode::FORBIDDEN,
                format!("channels/{}/messages", channel_id),
            ));
        }
        self.recorded
            .lock()
            .unwrap()
            .posts
            .push((channel_id.to_string(), content.to_string()));
        Ok(())
    }

    async fn bulk_overwrite_global_commands(
        &self,
        application_id: &str,
        commands: &[ApplicationCommand],
    ) -> Result<()> {
        self.recorded.lock().unwrap().overwrites.push(OverwriteCall {
            application_id: application_id.to_string(),
            guild_id: None,
            command_names: commands.iter().map(|c| c.name.clone()).collect(),
        });
        Ok(())
    }

    async fn bulk_overwrite_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: &[ApplicationCommand],
    ) -> Result<()> {
        self.recorded.lock().unwrap().overwrites.push(OverwriteCall {
            application_id: application_id.to_string(),
            guild_id: Some(guild_id.to_string()),
            command_names: commands.iter().map(|c| c.name.clone()).collect(),
        });

        if self.failing_guild_overwrites.contains(guild_id) {
            return Err(status_error(
                StatusCode::FORBIDDEN,
                format!("applications/{}/guilds/{}/commands", application_id, guild_id),
            ));
        }
        Ok(())
    }
}
