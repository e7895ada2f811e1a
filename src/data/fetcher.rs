//! Network fetch with on-disk cache fallback
//!
//! The cache acts as a buffer against upstream outages: fresh data is preferred
//! whenever the network is reachable (or a refresh is forced), and the last
//! cached payload is served when it is not.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::config::FeedConfig;

/// Errors that can occur when resolving a resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or timed out, and nothing was cached
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The upstream API answered with a non-success status, and nothing was cached
    #[error("Upstream returned HTTP {0}")]
    Status(StatusCode),

    /// The response arrived but its body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// The payload is not the JSON shape we expect
    #[error("Failed to parse JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Resolves remote resources to bytes through a [`CacheManager`]
#[derive(Debug, Clone)]
pub struct Fetcher {
    http_client: Client,
    cache: CacheManager,
    force_refresh: bool,
}

impl Fetcher {
    /// Creates a fetcher from the feed configuration
    ///
    /// Fails if the HTTP client (with the configured timeout) cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(config.fetch_timeout).build()?;
        Ok(Self::with_client(
            http_client,
            CacheManager::with_dir(&config.cache_dir),
            config.force_refresh,
        ))
    }

    /// Creates a fetcher with a custom HTTP client and cache
    pub fn with_client(http_client: Client, cache: CacheManager, force_refresh: bool) -> Self {
        Self {
            http_client,
            cache,
            force_refresh,
        }
    }

    /// Returns the cache backing this fetcher
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Resolves `url` to bytes, using `key` to address the cached copy
    ///
    /// # Behavior
    /// - Without force-refresh, a cached payload is returned without touching the network
    /// - Otherwise the URL is fetched and a successful body is written to the cache
    /// - If the request fails, the cached payload is returned when there is one
    /// - If the body cannot be read after a successful response, the error is
    ///   returned without consulting the cache
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - Fresh or cached payload
    /// * `Err(FetchError)` - The request failed and nothing is cached for `key`
    pub async fn resolve(&self, url: &str, key: &str) -> Result<Vec<u8>, FetchError> {
        if !self.force_refresh {
            if let Some(cached) = self.cache.read(key) {
                tracing::debug!(key, "serving cached payload");
                return Ok(cached);
            }
        }

        let response = match self.send(url).await {
            Ok(response) => response,
            Err(fetch_error) => {
                if let Some(cached) = self.cache.read(key) {
                    tracing::warn!(url, key, error = %fetch_error, "request failed, serving stale cache");
                    return Ok(cached);
                }
                return Err(fetch_error);
            }
        };

        let body = response.bytes().await.map_err(FetchError::Body)?.to_vec();

        if let Err(e) = self.cache.write(key, &body) {
            tracing::warn!(key, error = %e, "failed to write cache file");
        }

        Ok(body)
    }

    /// Sends a GET request, mapping non-success statuses to an error
    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Nothing listens on port 1, so connections are refused immediately
    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/v0/beststories.json";

    fn create_test_fetcher(force_refresh: bool) -> (Fetcher, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fetcher = Fetcher::with_client(
            Client::new(),
            CacheManager::with_dir(temp_dir.path()),
            force_refresh,
        );
        (fetcher, temp_dir)
    }

    #[tokio::test]
    async fn test_cached_payload_short_circuits_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/beststories.json")
            .with_status(200)
            .with_body("[9,9,9]")
            .expect(0)
            .create_async()
            .await;
        let (fetcher, _temp_dir) = create_test_fetcher(false);
        fetcher.cache().write("beststories", b"[1,2,3]").unwrap();

        let url = format!("{}/beststories.json", server.url());
        let payload = fetcher.resolve(&url, "beststories").await.unwrap();

        assert_eq!(payload, b"[1,2,3]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_persists_payload_to_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/item/8863.json")
            .with_status(200)
            .with_body(r#"{"id":8863}"#)
            .expect(1)
            .create_async()
            .await;
        let (fetcher, _temp_dir) = create_test_fetcher(false);

        let url = format!("{}/item/8863.json", server.url());
        let payload = fetcher.resolve(&url, "8863").await.unwrap();

        assert_eq!(payload, br#"{"id":8863}"#);
        assert_eq!(fetcher.cache().read("8863").as_deref(), Some(&payload[..]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_force_refresh_replaces_cached_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/beststories.json")
            .with_status(200)
            .with_body("[4,5,6]")
            .expect(1)
            .create_async()
            .await;
        let (fetcher, _temp_dir) = create_test_fetcher(true);
        fetcher.cache().write("beststories", b"[1,2,3]").unwrap();

        let url = format!("{}/beststories.json", server.url());
        let payload = fetcher.resolve(&url, "beststories").await.unwrap();

        assert_eq!(payload, b"[4,5,6]");
        assert_eq!(fetcher.cache().read("beststories").as_deref(), Some(&b"[4,5,6]"[..]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_network_failure_falls_back_to_cache() {
        let (fetcher, _temp_dir) = create_test_fetcher(true);
        fetcher.cache().write("beststories", b"[1,2,3]").unwrap();

        let payload = fetcher.resolve(UNREACHABLE_URL, "beststories").await.unwrap();

        assert_eq!(payload, b"[1,2,3]");
    }

    #[tokio::test]
    async fn test_network_failure_without_cache_is_an_error() {
        let (fetcher, _temp_dir) = create_test_fetcher(false);

        let result = fetcher.resolve(UNREACHABLE_URL, "beststories").await;

        assert!(matches!(result, Err(FetchError::Network(_))));
        assert!(fetcher.cache().read("beststories").is_none());
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_cache() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/item/3.json")
            .with_status(503)
            .create_async()
            .await;
        let (fetcher, _temp_dir) = create_test_fetcher(true);
        fetcher.cache().write("3", br#"{"id":3}"#).unwrap();

        let url = format!("{}/item/3.json", server.url());
        let payload = fetcher.resolve(&url, "3").await.unwrap();

        assert_eq!(payload, br#"{"id":3}"#);
    }

    #[tokio::test]
    async fn test_error_status_without_cache_is_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/item/3.json")
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;
        let (fetcher, _temp_dir) = create_test_fetcher(false);

        let url = format!("{}/item/3.json", server.url());
        let result = fetcher.resolve(&url, "3").await;

        match result {
            Err(FetchError::Status(status)) => assert_eq!(status.as_u16(), 500),
            other => panic!("Expected status error, got {:?}", other),
        }
        assert!(fetcher.cache().read("3").is_none());
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/item/1.json")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the cache directory should be makes every write fail
        let blocked = temp_dir.path().join("cache");
        std::fs::write(&blocked, b"not a directory").unwrap();
        let fetcher = Fetcher::with_client(Client::new(), CacheManager::with_dir(&blocked), false);

        let url = format!("{}/item/1.json", server.url());
        let payload = fetcher.resolve(&url, "1").await.unwrap();

        assert_eq!(payload, br#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_body_read_failure_skips_cache_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            // Promise 100 bytes, send two, then hang up
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n[9")
                .await;
            let _ = socket.shutdown().await;
        });
        let (fetcher, _temp_dir) = create_test_fetcher(true);
        fetcher.cache().write("beststories", b"[1,2,3]").unwrap();

        let url = format!("http://{}/beststories.json", addr);
        let result = fetcher.resolve(&url, "beststories").await;

        assert!(matches!(result, Err(FetchError::Body(_))), "got {:?}", result);
        assert_eq!(fetcher.cache().read("beststories").as_deref(), Some(&b"[1,2,3]"[..]));
    }

    #[tokio::test]
    async fn test_new_applies_configured_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without ever answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        let temp_dir = TempDir::new().unwrap();
        let mut config = FeedConfig::rooted_at(temp_dir.path());
        config.fetch_timeout = Duration::from_millis(200);
        let fetcher = Fetcher::new(&config).unwrap();

        let url = format!("http://{}/beststories.json", addr);
        let result = fetcher.resolve(&url, "beststories").await;

        match result {
            Err(FetchError::Network(e)) => assert!(e.is_timeout(), "expected timeout, got {}", e),
            other => panic!("Expected network error, got {:?}", other),
        }
    }
}
