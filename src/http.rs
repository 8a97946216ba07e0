// HTTP client adapter: bearer credentials on the way out, error mapping and
// media URL rewriting on the way back

use crate::error::ApiError;
use crate::media::MediaResolver;
use crate::token_store::TokenStore;
use crate::transport::{ApiRequest, Transport};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default, Clone)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub requests_retried: usize,
    pub requests_unauthorized: usize,
    pub average_response_time_ms: f64,
    pub max_response_time_ms: f64,
}

impl ClientStats {
    fn record(&mut self, elapsed_ms: f64, success: bool) {
        self.requests_sent += 1;
        if success {
            self.requests_succeeded += 1;
        } else {
            self.requests_failed += 1;
        }
        let n = self.requests_sent as f64;
        self.average_response_time_ms += (elapsed_ms - self.average_response_time_ms) / n;
        self.max_response_time_ms = self.max_response_time_ms.max(elapsed_ms);
    }
}

pub struct HttpClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    media: MediaResolver,
    stats: Mutex<ClientStats>,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        media: MediaResolver,
    ) -> Self {
        Self {
            transport,
            tokens,
            media,
            stats: Mutex::new(ClientStats::default()),
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn media(&self) -> &MediaResolver {
        &self.media
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }

    pub(crate) fn note_retry(&self) {
        self.stats.lock().requests_retried += 1;
    }

    // Sends one request and returns the decoded, media-rewritten JSON body.
    // An empty 2xx body (204 No Content) comes back as `Value::Null`.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        if request.bearer.is_none() && !request.anonymous {
            request.bearer = self.tokens.access_token();
        }
        let authenticated = request.bearer.is_some();

        let method = request.method.clone();
        let path = request.path.clone();
        tracing::debug!(%method, %path, authenticated, "Sending request");

        let started = Instant::now();
        let result = self.transport.send(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.stats.lock().record(elapsed_ms, false);
                tracing::debug!(%method, %path, error = %err, "Transport failure");
                return Err(err);
            }
        };

        if !response.is_success() {
            self.stats.lock().record(elapsed_ms, false);
            let err = ApiError::from_response(response.status, &response.body);
            if let ApiError::Unauthorized(_) = err {
                self.handle_unauthorized(authenticated);
            }
            tracing::debug!(%method, %path, status = response.status, error = %err, "Request rejected");
            return Err(err);
        }

        self.stats.lock().record(elapsed_ms, true);
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let mut body: Value = serde_json::from_slice(&response.body)?;
        let rewritten = self.media.rewrite(&mut body);
        tracing::debug!(%method, %path, status = response.status, rewritten, "Request succeeded");
        Ok(body)
    }

    // The stored credentials are no longer accepted; drop them so the next
    // action starts from a logged-out state
    fn handle_unauthorized(&self, authenticated: bool) {
        self.stats.lock().requests_unauthorized += 1;
        if authenticated && self.tokens.load().is_some() {
            tracing::warn!("Server rejected credentials, clearing stored tokens");
            if let Err(e) = self.tokens.clear() {
                tracing::warn!(error = %e, "Failed to clear stored tokens");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockServer};
    use crate::models::AuthTokens;
    use crate::token_store::MemoryTokenStore;
    use crate::transport::Method;
    use serde_json::json;

    fn setup(tokens: Option<&str>) -> (Arc<MockServer>, Arc<MemoryTokenStore>, HttpClient) {
        let server = Arc::new(MockServer::new());
        let store = Arc::new(match tokens {
            Some(access) => MemoryTokenStore::with_tokens(AuthTokens {
                access: access.to_string(),
                refresh: None,
            }),
            None => MemoryTokenStore::new(),
        });
        let client = HttpClient::new(
            server.clone(),
            store.clone(),
            MediaResolver::new("http://localhost:8000"),
        );
        (server, store, client)
    }

    #[tokio::test]
    async fn test_attaches_stored_bearer_token() {
        let (server, _, client) = setup(Some("token-123"));
        server.ok(Method::GET, "accounts/profile/", json!({"id": 1}));

        client.execute(ApiRequest::get("accounts/profile/")).await.unwrap();

        let sent = server.last_request().unwrap();
        assert_eq!(sent.bearer.as_deref(), Some("token-123"));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_bearer() {
        let (server, _, client) = setup(None);
        server.ok(Method::GET, "hotels/search/", json!([]));

        client.execute(ApiRequest::get("hotels/search/")).await.unwrap();

        assert!(server.last_request().unwrap().bearer.is_none());
    }

    #[tokio::test]
    async fn test_rewrites_media_paths_in_response() {
        let (server, _, client) = setup(None);
        server.ok(
            Method::GET,
            "hotels/search/4/",
            json!({"id": 4, "images": [{"id": 1, "image": "/media/hotel_images/p.jpg"}]}),
        );

        let body = client.execute(ApiRequest::get("hotels/search/4/")).await.unwrap();
        assert_eq!(body["images"][0]["image"], "http://localhost:8000/hotel_images/p.jpg");
    }

    #[tokio::test]
    async fn test_unauthorized_clears_tokens() {
        let (server, store, client) = setup(Some("expired"));
        server.on(
            Method::GET,
            "hotels/bookings/",
            MockReply::Status(401, json!({"detail": "Given token not valid for any token type"})),
        );

        let err = client.execute(ApiRequest::get("hotels/bookings/")).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(store.load().is_none());
        assert_eq!(client.stats().requests_unauthorized, 1);
    }

    #[tokio::test]
    async fn test_anonymous_request_keeps_session_on_401() {
        let (server, store, client) = setup(Some("still-valid"));
        server.on(
            Method::POST,
            "accounts/login/",
            MockReply::Status(401, json!({"error": "Invalid credentials"})),
        );

        let err = client
            .execute(ApiRequest::post("accounts/login/").anonymous())
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(server.last_request().unwrap().bearer.is_none());
        assert_eq!(store.access_token().as_deref(), Some("still-valid"));
    }

    #[tokio::test]
    async fn test_error_body_and_stats() {
        let (server, _, client) = setup(Some("t"));
        server.on(
            Method::POST,
            "hotels/bookings/",
            MockReply::Status(400, json!({"detail": "This room is not available for the selected dates."})),
        );
        server.on(Method::DELETE, "hotels/favorites/2/", MockReply::Empty(204));

        let err = client
            .execute(ApiRequest::post("hotels/bookings/").json(json!({"room": 1})))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "This room is not available for the selected dates.");

        let empty = client.execute(ApiRequest::delete("hotels/favorites/2/")).await.unwrap();
        assert!(empty.is_null());

        let stats = client.stats();
        assert_eq!(stats.requests_sent, 2);
        assert_eq!(stats.requests_failed, 1);
        assert_eq!(stats.requests_succeeded, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_passed_through() {
        let (server, _, client) = setup(None);
        server.on(
            Method::GET,
            "hotels/search/",
            MockReply::Fail(ApiError::NetworkError("connection refused".to_string())),
        );

        let err = client.execute(ApiRequest::get("hotels/search/")).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
