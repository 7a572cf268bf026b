//! Bounded retry-on-429 wrapper around a [`Transport`].
//!
//! Discord enforces per-route and global rate limits. Every outbound call in
//! this workspace goes through [`RateLimitedClient::send`] so that all callers
//! back off the same way.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::Result;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wait used when Discord does not say how long to back off.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Retries 429 responses, sleeping for the advertised `retry_after`.
#[derive(Clone)]
pub struct RateLimitedClient<T> {
    transport: T,
    max_retries: u32,
}

impl<T: Transport> RateLimitedClient<T> {
    /// Wraps a transport with the default retry budget.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets the retry budget used by [`send`](Self::send).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a request with the configured retry budget.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.send_with_retries(request, self.max_retries).await
    }

    /// Sends a request, retrying 429s up to `max_retries` times.
    ///
    /// Any non-429 response is returned untouched, success or not. When the
    /// budget runs out the final 429 is returned rather than turned into an
    /// error; interpreting it is the caller's job. Only transport failures
    /// (no response at all) produce `Err`.
    pub async fn send_with_retries(
        &self,
        request: &ApiRequest,
        max_retries: u32,
    ) -> Result<ApiResponse> {
        let mut retry_count = 0;

        loop {
            let response = self.transport.execute(request).await?;

            if response.status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            if retry_count >= max_retries {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    max_retries,
                    "rate limit retries exhausted"
                );
                return Ok(response);
            }

            let wait = retry_after(&response);
            info!(
                path = %request.path,
                wait_secs = wait.as_secs_f64(),
                attempt = retry_count + 1,
                of = max_retries + 1,
                "rate limited (429), backing off"
            );

            sleep(wait).await;
            retry_count += 1;
        }
    }
}

#[derive(Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
}

/// How long a 429 response asks us to wait.
///
/// The `retry-after` header wins; otherwise the JSON body's `retry_after`
/// field is used. A hint of zero means retry at once. Missing, unparsable,
/// negative or unrepresentable values fall back to one second.
pub fn retry_after(response: &ApiResponse) -> Duration {
    let seconds = match response.header("retry-after") {
        Some(header) => header.trim().parse::<f64>().ok(),
        None => serde_json::from_str::<RateLimitBody>(&response.body)
            .ok()
            .and_then(|body| body.retry_after),
    };

    seconds
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}
