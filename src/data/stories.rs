//! Hacker News API client
//!
//! Fetches the best-stories ranking and individual story records through the
//! cached [`Fetcher`].

use super::{FetchError, Fetcher, Story};
use crate::config::FeedConfig;

/// Cache key for the best-stories ranking
pub const BEST_STORIES_CACHE_KEY: &str = "beststories";

/// Number of top-ranked stories included in a feed
pub const STORIES_TO_FETCH: usize = 5;

/// Client for the Hacker News Firebase API
#[derive(Debug, Clone)]
pub struct StoriesClient {
    fetcher: Fetcher,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl StoriesClient {
    /// Creates a new StoriesClient from the feed configuration
    pub fn new(config: &FeedConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_fetcher(
            Fetcher::new(config)?,
            config.api_base_url.clone(),
        ))
    }

    /// Creates a new StoriesClient with a custom fetcher and base URL
    pub fn with_fetcher(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the ids of the best stories, in ranking order
    ///
    /// Only the first [`STORIES_TO_FETCH`] ids are returned. A payload that is
    /// not a JSON array of integers yields an empty list rather than an error.
    ///
    /// # Returns
    /// * `Ok(Vec<u64>)` - Up to five ids
    /// * `Err(FetchError)` - The ranking could not be fetched and is not cached
    pub async fn fetch_ranked_ids(&self) -> Result<Vec<u64>, FetchError> {
        let url = format!("{}/beststories.json", self.base_url);
        let payload = self.fetcher.resolve(&url, BEST_STORIES_CACHE_KEY).await?;

        let mut ids: Vec<u64> = match serde_json::from_slice(&payload) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse story ids");
                return Ok(Vec::new());
            }
        };
        ids.truncate(STORIES_TO_FETCH);
        Ok(ids)
    }

    /// Fetches a single story by id
    ///
    /// A malformed payload is a hard error: the same bytes would be served from
    /// the cache again, so retrying cannot help until the next forced refresh.
    pub async fn fetch_item(&self, id: u64) -> Result<Story, FetchError> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        let payload = self.fetcher.resolve(&url, &id.to_string()).await?;
        Ok(serde_json::from_slice(&payload)?)
    }
}
