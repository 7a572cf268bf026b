//! Shared fixtures for handler and router tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};

use keeper_core::{mailer, Email, Mailer};
use keeper_discord::mock::MockDiscord;

use crate::config::ServerConfig;
use crate::signature::tests::{public_hex, sign};
use crate::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::state::AppState;

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub(crate) fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> mailer::Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

fn build(
    config: ServerConfig,
    api: MockDiscord,
) -> (AppState, Arc<MockDiscord>, Arc<RecordingMailer>) {
    let api = Arc::new(api);
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(config, api.clone(), mailer.clone()).unwrap();
    (state, api, mailer)
}

/// State whose verifier accepts requests signed by the test key.
pub(crate) fn signed_state(api: MockDiscord) -> (AppState, Arc<MockDiscord>, Arc<RecordingMailer>) {
    build(ServerConfig::default().with_public_key(public_hex()), api)
}

/// State with no public key configured.
pub(crate) fn unsigned_state() -> (AppState, Arc<MockDiscord>, Arc<RecordingMailer>) {
    build(ServerConfig::default(), MockDiscord::new())
}

/// POSTs a correctly signed interaction body.
pub(crate) async fn post_signed(server: &TestServer, body: &str) -> TestResponse {
    let timestamp = "1760443200";
    server
        .post("/interactions")
        .add_header(
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderValue::from_str(&sign(timestamp, body)).unwrap(),
        )
        .add_header(
            HeaderName::from_static(TIMESTAMP_HEADER),
            HeaderValue::from_static(timestamp),
        )
        .content_type("application/json")
        .bytes(Bytes::from(body.to_string()))
        .await
}

/// Polls until background work satisfies `done`, failing after a second.
pub(crate) async fn eventually(done: impl Fn() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("background task did not finish");
}
