//! Who asked for an operation, and where.

use serde::{Deserialize, Serialize};

/// The user who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestingUser {
    pub id: String,
    pub username: String,
}

impl RequestingUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// Everything an operation needs to know about its invocation.
///
/// Built from the interaction payload and dropped when the operation ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContext {
    pub channel_id: String,
    pub channel_name: String,
    pub requested_by: RequestingUser,
    /// Absent for interactions outside a guild (DMs).
    pub guild_id: Option<String>,
}

impl OperationContext {
    pub fn new(
        channel_id: impl Into<String>,
        channel_name: impl Into<String>,
        requested_by: RequestingUser,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_name: channel_name.into(),
            requested_by,
            guild_id: None,
        }
    }

    pub fn with_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Reason recorded in the guild audit log for each deletion.
    pub fn audit_reason(&self) -> String {
        format!(
            "Clean command by user {} (ID: {})",
            self.requested_by.username, self.requested_by.id
        )
    }
}
