// In-process stand-in for the booking backend used by the unit tests

use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockReply {
    Status(u16, Value),
    Empty(u16),
    Fail(ApiError),
}

// Replies are queued per (method, path) and consumed in order; the last one
// keeps being served so a steady endpoint needs a single registration
#[derive(Default)]
pub struct MockServer {
    replies: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay_ms: AtomicU64,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.replies
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) -> &Self {
        self.on(method, path, MockReply::Status(200, body))
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().last().cloned()
    }

    fn next_reply(&self, method: &Method, path: &str) -> Option<MockReply> {
        let mut replies = self.replies.lock();
        let queue = replies.get_mut(&(method.clone(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();
        self.requests.lock().push(request);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        match self.next_reply(&method, &path) {
            Some(MockReply::Status(status, body)) => Ok(ApiResponse {
                status,
                body: Bytes::from(body.to_string()),
            }),
            Some(MockReply::Empty(status)) => Ok(ApiResponse {
                status,
                body: Bytes::new(),
            }),
            Some(MockReply::Fail(err)) => Err(err),
            None => Ok(ApiResponse {
                status: 404,
                body: Bytes::from(r#"{"detail": "Not found."}"#),
            }),
        }
    }
}
