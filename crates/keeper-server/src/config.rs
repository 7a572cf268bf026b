//! Server configuration.

use std::time::Instant;

/// Interactions server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Hex-encoded Ed25519 application public key. Requests are rejected
    /// while it is unset.
    pub public_key: Option<String>,
    /// Page ceiling for history walks. `None` walks everything.
    pub max_pages: Option<usize>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ServerConfig {
    /// Creates a configuration bound to the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_key: None,
            max_pages: None,
            start_time: Instant::now(),
        }
    }
}
