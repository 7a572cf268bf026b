//! Application state shared across handlers.

use std::sync::Arc;

use keeper_core::{ChannelKeeper, Mailer};
use keeper_discord::DiscordApi;

use crate::config::ServerConfig;
use crate::signature::{InteractionVerifier, KeyError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Signature checker for `/interactions`.
    pub verifier: Arc<InteractionVerifier>,
    /// Runs the background channel operations.
    pub keeper: ChannelKeeper,
}

impl AppState {
    /// Wires the state from its collaborators.
    ///
    /// Fails if the configured public key cannot be parsed. A missing key is
    /// allowed; every interaction is then rejected with 401.
    pub fn new(
        config: ServerConfig,
        api: Arc<dyn DiscordApi>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, KeyError> {
        let verifier = match config.public_key.as_deref() {
            Some(key) => InteractionVerifier::from_hex(key)?,
            None => InteractionVerifier::unconfigured(),
        };
        let keeper = ChannelKeeper::new(api, mailer).with_max_pages(config.max_pages);

        Ok(Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            keeper,
        })
    }

    /// Overrides the email sender identity.
    pub fn with_email_from(mut self, from: impl Into<String>) -> Self {
        self.keeper = self.keeper.with_from(from);
        self
    }
}
