//! Typed Discord REST endpoints used by the bot.

use async_trait::async_trait;
use tracing::debug;

use crate::commands::ApplicationCommand;
use crate::error::Result;
use crate::rate_limit::RateLimitedClient;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::types::{CreateMessage, Guild, GuildMember, Message};

/// The Discord endpoints the bot depends on.
///
/// Object-safe so orchestrators can hold an `Arc<dyn DiscordApi>` and tests
/// can substitute an in-memory channel.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Lists up to `limit` messages, newest first, strictly older than `before`.
    async fn list_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>>;

    /// Deletes one message, recording `audit_reason` in the guild audit log.
    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
        audit_reason: &str,
    ) -> Result<()>;

    async fn get_guild(&self, guild_id: &str) -> Result<Guild>;

    async fn get_guild_member(&self, guild_id: &str, user_id: &str) -> Result<GuildMember>;

    /// Posts a plain text message into a channel.
    async fn create_message(&self, channel_id: &str, content: &str) -> Result<()>;

    /// Replaces every global command of the application.
    async fn bulk_overwrite_global_commands(
        &self,
        application_id: &str,
        commands: &[ApplicationCommand],
    ) -> Result<()>;

    /// Replaces every command of the application in one guild.
    async fn bulk_overwrite_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: &[ApplicationCommand],
    ) -> Result<()>;
}

/// [`DiscordApi`] over a rate-limited transport.
#[derive(Clone)]
pub struct DiscordClient<T> {
    http: RateLimitedClient<T>,
}

impl DiscordClient<HttpTransport> {
    /// Client for the public API authenticated with a bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_transport(HttpTransport::new(token))
    }
}

impl<T: Transport> DiscordClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            http: RateLimitedClient::new(transport),
        }
    }

    /// Overrides the per-request 429 retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.http = self.http.with_max_retries(max_retries);
        self
    }

    pub fn http(&self) -> &RateLimitedClient<T> {
        &self.http
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.http.send(&request).await?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = %response.status,
            "discord response"
        );
        response.error_for_status(&request.path)
    }
}

#[async_trait]
impl<T: Transport> DiscordApi for DiscordClient<T> {
    async fn list_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>> {
        let mut request =
            ApiRequest::get(format!("channels/{}/messages", channel_id)).query("limit", limit);
        if let Some(before) = before {
            request = request.query("before", before);
        }
        self.call(request).await?.json()
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
        audit_reason: &str,
    ) -> Result<()> {
        let request = ApiRequest::delete(format!("channels/{}/messages/{}", channel_id, message_id))
            .audit_reason(audit_reason);
        self.call(request).await?;
        Ok(())
    }

    async fn get_guild(&self, guild_id: &str) -> Result<Guild> {
        self.call(ApiRequest::get(format!("guilds/{}", guild_id)))
            .await?
            .json()
    }

    async fn get_guild_member(&self, guild_id: &str, user_id: &str) -> Result<GuildMember> {
        self.call(ApiRequest::get(format!("guilds/{}/members/{}", guild_id, user_id)))
            .await?
            .json()
    }

    async fn create_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let body = serde_json::to_value(CreateMessage {
            content: content.to_string(),
        })?;
        self.call(ApiRequest::post(format!("channels/{}/messages", channel_id)).json(body))
            .await?;
        Ok(())
    }

    async fn bulk_overwrite_global_commands(
        &self,
        application_id: &str,
        commands: &[ApplicationCommand],
    ) -> Result<()> {
        let body = serde_json::to_value(commands)?;
        self.call(ApiRequest::put(format!("applications/{}/commands", application_id)).json(body))
            .await?;
        Ok(())
    }

    async fn bulk_overwrite_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: &[ApplicationCommand],
    ) -> Result<()> {
        let body = serde_json::to_value(commands)?;
        let path = format!("applications/{}/guilds/{}/commands", application_id, guild_id);
        self.call(ApiRequest::put(path).json(body)).await?;
        Ok(())
    }
}
