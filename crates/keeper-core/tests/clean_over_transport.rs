//! Clean run through the real `DiscordClient`, rate limiter included, over a
//! scripted transport that behaves like the Discord message endpoints.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::json;

use keeper_core::{ChannelKeeper, Email, Mailer, OperationContext, RequestingUser};
use keeper_discord::{ApiRequest, ApiResponse, DiscordClient, Transport};

struct NoMail;

#[async_trait]
impl Mailer for NoMail {
    async fn send(&self, _email: &Email) -> keeper_core::mailer::Result<()> {
        Ok(())
    }
}

/// Serves `channels/chan/messages` from memory. The first delete is
/// rate limited once.
struct ChannelTransport {
    // (id, pinned), ascending by id.
    messages: Mutex<Vec<(u64, bool)>>,
    requests: Mutex<Vec<ApiRequest>>,
    limited_once: Mutex<bool>,
}

impl ChannelTransport {
    fn new(count: u64, pinned: &[u64]) -> Self {
        Self {
            messages: Mutex::new((1..=count).map(|id| (id, pinned.contains(&id))).collect()),
            requests: Mutex::new(Vec::new()),
            limited_once: Mutex::new(false),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn query(request: &ApiRequest, key: &str) -> Option<u64> {
        request
            .query
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.parse().ok())
    }

    fn list(&self, request: &ApiRequest) -> ApiResponse {
        let limit = Self::query(request, "limit").unwrap_or(50) as usize;
        let before = Self::query(request, "before").unwrap_or(u64::MAX);

        let page: Vec<serde_json::Value> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(id, _)| *id < before)
            .take(limit)
            .map(|(id, pinned)| {
                json!({
                    "id": id.to_string(),
                    "type": 0,
                    "timestamp": "2025-10-14T12:00:00+00:00",
                    "content": format!("line {}", id),
                    "author": {"id": "7", "username": "wren"},
                    "pinned": pinned
                })
            })
            .collect();
        ApiResponse::new(StatusCode::OK, serde_json::to_string(&page).unwrap())
    }

    fn delete(&self, id: u64) -> ApiResponse {
        let mut limited = self.limited_once.lock().unwrap();
        if !*limited {
            *limited = true;
            return ApiResponse::new(
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"message": "You are being rate limited.", "retry_after": 3}"#,
            )
            .with_header("retry-after", "1");
        }
        self.messages.lock().unwrap().retain(|(m, _)| *m != id);
        ApiResponse::new(StatusCode::NO_CONTENT, "")
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn execute(&self, request: &ApiRequest) -> keeper_discord::Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let segments: Vec<&str> = request.path.split('/').collect();
        let response = match (&request.method, segments.as_slice()) {
            (&Method::GET, ["channels", "chan", "messages"]) => self.list(request),
            (&Method::DELETE, ["channels", "chan", "messages", id]) => {
                self.delete(id.parse().unwrap_or(0))
            }
            _ => ApiResponse::new(StatusCode::NOT_FOUND, r#"{"message": "Unknown"}"#),
        };
        Ok(response)
    }
}

#[tokio::test(start_paused = true)]
async fn clean_deletes_unpinned_through_rate_limit() {
    let transport = Arc::new(ChannelTransport::new(120, &[5, 60]));
    let client = DiscordClient::with_transport(SharedTransport(transport.clone()));
    let keeper = ChannelKeeper::new(Arc::new(client), Arc::new(NoMail));
    let ctx = OperationContext::new("chan", "tavern", RequestingUser::new("42", "wren"));

    let start = tokio::time::Instant::now();
    let summary = keeper.clean(&ctx).await.unwrap();

    assert_eq!(summary.requested, 118);
    assert_eq!(summary.deleted, 118);
    assert_eq!(summary.failed, 0);

    let requests = transport.requests();
    let lists: Vec<&ApiRequest> = requests.iter().filter(|r| r.method == Method::GET).collect();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].query[1], ("before".to_string(), "21".to_string()));

    // 118 deletes plus the one retried 429.
    let deletes = requests.iter().filter(|r| r.method == Method::DELETE).count();
    assert_eq!(deletes, 119);
    assert!(requests
        .iter()
        .filter(|r| r.method == Method::DELETE)
        .all(|r| r.audit_reason.as_deref() == Some("Clean command by user wren (ID: 42)")));

    // Header wins over the body's retry_after.
    let waited = start.elapsed();
    assert!(waited >= std::time::Duration::from_secs(1));
    assert!(waited < std::time::Duration::from_secs(3));

    let left: Vec<u64> = transport
        .messages
        .lock()
        .unwrap()
        .iter()
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(left, vec![5, 60]);
}

/// Lets the test keep a handle on the transport the client owns.
struct SharedTransport(Arc<ChannelTransport>);

#[async_trait]
impl Transport for SharedTransport {
    async fn execute(&self, request: &ApiRequest) -> keeper_discord::Result<ApiResponse> {
        self.0.execute(request).await
    }
}
