// Booking API client: cached reads, invalidating writes

use crate::cache::{CacheConfig, CacheStatsReport, Invalidation, QueryCache, QueryKey};
use crate::config::{ClientConfig, RetryConfig};
use crate::error::{ApiError, ClientError};
use crate::http::{ClientStats, HttpClient};
use crate::media::MediaResolver;
use crate::token_store::{FileTokenStore, TokenStore};
use crate::transport::{ApiRequest, ReqwestTransport, Transport};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

// A cacheable GET
#[derive(Debug, Clone)]
pub struct Query {
    pub key: QueryKey,
    pub request: ApiRequest,
}

impl Query {
    pub fn new(key: QueryKey, request: ApiRequest) -> Self {
        Self { key, request }
    }
}

// A write plus the cache entries it makes stale
#[derive(Debug, Clone)]
pub struct Mutation {
    pub request: ApiRequest,
    pub invalidates: Vec<Invalidation>,
}

impl Mutation {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            invalidates: Vec::new(),
        }
    }

    pub fn invalidates(mut self, invalidation: Invalidation) -> Self {
        self.invalidates.push(invalidation);
        self
    }
}

pub struct TripfferClient {
    http: HttpClient,
    cache: QueryCache,
    config: ClientConfig,
}

impl TripfferClient {
    // Real HTTP transport and the on-disk token file from `config`
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.api_url()?, config.timeout())?;
        let tokens = FileTokenStore::open(config.token_path.clone());
        Ok(Self::with_parts(config, Arc::new(transport), Arc::new(tokens)))
    }

    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let media = MediaResolver::new(&config.media_base_url);
        let cache = QueryCache::new(CacheConfig {
            stale_time: config.stale_time(),
            max_entries: config.max_cache_entries,
        });
        Self {
            http: HttpClient::new(transport, tokens, media),
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn media(&self) -> &MediaResolver {
        self.http.media()
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.http.tokens()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().access_token().is_some()
    }

    pub fn stats(&self) -> ClientStats {
        self.http.stats()
    }

    pub fn cache_stats(&self) -> CacheStatsReport {
        self.cache.stats()
    }

    // Served from the cache while fresh; otherwise one GET (plus retries for
    // transient failures) whose result is cached unless invalidated meanwhile
    pub async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<T, ApiError> {
        if let Some(cached) = self.cache.get(&query.key) {
            tracing::debug!(key = %query.key, "Serving query from cache");
            return Ok(serde_json::from_slice(&cached)?);
        }

        let ticket = self.cache.begin_fetch(query.key.clone());
        let body = self
            .execute_with_retry(&query.request, &self.config.retry)
            .await?;

        let value: T = serde_json::from_value(body.clone())?;
        let encoded = Bytes::from(serde_json::to_vec(&body)?);
        self.cache.complete_fetch(ticket, encoded);
        Ok(value)
    }

    // Sent exactly once. Invalidation happens before this returns, so any
    // read issued afterwards goes to the network.
    pub async fn mutate<T: DeserializeOwned>(&self, mutation: Mutation) -> Result<T, ApiError> {
        let body = self.http.execute(mutation.request).await?;
        for invalidation in &mutation.invalidates {
            self.cache.invalidate(invalidation);
        }
        Ok(serde_json::from_value(body)?)
    }

    // Uncached request, for endpoints whose answer must never be reused
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.http.execute(request).await
    }

    async fn execute_with_retry(
        &self,
        request: &ApiRequest,
        retry: &RetryConfig,
    ) -> Result<Value, ApiError> {
        let mut attempt = 0;
        loop {
            match self.http.execute(request.clone()).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    let delay = retry.backoff(attempt);
                    attempt += 1;
                    self.http.note_retry();
                    tracing::warn!(
                        path = %request.path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying read"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::client_with;
    use super::*;
    use crate::cache::Resource;
    use crate::mock::{MockReply, MockServer};
    use crate::transport::Method;
    use serde_json::json;

    fn favorites_query() -> Query {
        Query::new(
            QueryKey::new(Resource::Favorites),
            ApiRequest::get("hotels/favorites/"),
        )
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/favorites/", json!([]));
        let client = client_with(&server, Some("t"));

        let first: Vec<Value> = client.fetch(&favorites_query()).await.unwrap();
        let second: Vec<Value> = client.fetch(&favorites_query()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(server.request_count(), 1);
        assert_eq!(client.cache_stats().hit_count, 1);
    }

    #[tokio::test]
    async fn test_successful_write_forces_refetch() {
        let server = Arc::new(MockServer::new());
        server
            .ok(Method::GET, "hotels/favorites/", json!([]))
            .ok(Method::GET, "hotels/favorites/", json!([{"id": 1}]));
        server.on(
            Method::POST,
            "hotels/favorites/",
            MockReply::Status(201, json!({"id": 1})),
        );
        let client = client_with(&server, Some("t"));

        let before: Vec<Value> = client.fetch(&favorites_query()).await.unwrap();
        assert!(before.is_empty());

        let _: Value = client
            .mutate(
                Mutation::new(ApiRequest::post("hotels/favorites/").json(json!({"hotel": 3})))
                    .invalidates(Invalidation::Resource(Resource::Favorites)),
            )
            .await
            .unwrap();

        let after: Vec<Value> = client.fetch(&favorites_query()).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(server.count(&Method::GET, "hotels/favorites/"), 2);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/favorites/", json!([]));
        server.on(
            Method::POST,
            "hotels/favorites/",
            MockReply::Status(400, json!({"detail": "This hotel is already in your favorites."})),
        );
        let client = client_with(&server, Some("t"));

        let _: Vec<Value> = client.fetch(&favorites_query()).await.unwrap();
        let err = client
            .mutate::<Value>(
                Mutation::new(ApiRequest::post("hotels/favorites/").json(json!({"hotel": 3})))
                    .invalidates(Invalidation::Resource(Resource::Favorites)),
            )
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "This hotel is already in your favorites.");
        assert!(client.cache().contains(&QueryKey::new(Resource::Favorites)));
        // Writes are not retried
        assert_eq!(server.count(&Method::POST, "hotels/favorites/"), 1);
    }

    #[tokio::test]
    async fn test_read_retries_once_on_server_error() {
        let server = Arc::new(MockServer::new());
        server
            .on(
                Method::GET,
                "hotels/favorites/",
                MockReply::Status(503, json!({"detail": "Service temporarily unavailable"})),
            )
            .ok(Method::GET, "hotels/favorites/", json!([]));
        let client = client_with(&server, Some("t"));

        let favorites: Vec<Value> = client.fetch(&favorites_query()).await.unwrap();

        assert!(favorites.is_empty());
        assert_eq!(server.request_count(), 2);
        assert_eq!(client.stats().requests_retried, 1);
    }

    #[tokio::test]
    async fn test_read_gives_up_after_single_retry() {
        let server = Arc::new(MockServer::new());
        server.on(
            Method::GET,
            "hotels/favorites/",
            MockReply::Fail(ApiError::NetworkError("connection reset".to_string())),
        );
        let client = client_with(&server, Some("t"));

        let err = client.fetch::<Vec<Value>>(&favorites_query()).await.unwrap_err();

        assert!(matches!(err, ApiError::NetworkError(_)));
        assert_eq!(server.request_count(), 2);
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = Arc::new(MockServer::new());
        server.on(
            Method::GET,
            "hotels/search/99/",
            MockReply::Status(404, json!({"detail": "Not found."})),
        );
        let client = client_with(&server, None);
        let query = Query::new(
            QueryKey::with_id(Resource::HotelDetails, 99),
            ApiRequest::get("hotels/search/99/"),
        );

        let err = client.fetch::<Value>(&query).await.unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_read_in_flight_during_write_is_not_cached() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/favorites/", json!([]));
        server.on(Method::DELETE, "hotels/favorites/1/", MockReply::Empty(204));
        server.set_delay(30);
        let client = Arc::new(client_with(&server, Some("t")));

        let reader = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.fetch::<Vec<Value>>(&favorites_query()).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        // The GET is now sleeping inside the mock; let the DELETE answer at once
        server.set_delay(0);
        client
            .mutate::<()>(
                Mutation::new(ApiRequest::delete("hotels/favorites/1/"))
                    .invalidates(Invalidation::Resource(Resource::Favorites)),
            )
            .await
            .unwrap();

        reader.await.unwrap().unwrap();
        assert!(!client.cache().contains(&QueryKey::new(Resource::Favorites)));
        assert_eq!(client.cache_stats().rejected_count, 1);
    }
}
