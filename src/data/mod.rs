//! Story data and the clients that fetch it
//!
//! This module contains the Hacker News story model and the fetch layer that
//! resolves remote resources through the on-disk cache.

pub mod fetcher;
pub mod stories;

pub use fetcher::{FetchError, Fetcher};
pub use stories::{StoriesClient, BEST_STORIES_CACHE_KEY, STORIES_TO_FETCH};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Host used to build discussion links for stories without an external URL
pub const HN_ITEM_URL: &str = "https://news.ycombinator.com/item";

/// A Hacker News story as returned by the item endpoint
///
/// Every field is optional upstream (deleted and dead items omit most of them),
/// so missing fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Story {
    /// Item id
    pub id: u64,
    /// Headline
    pub title: String,
    /// External link; absent for Ask HN and similar text posts
    pub url: Option<String>,
    /// Points
    pub score: i64,
    /// Creation time in Unix seconds
    pub time: i64,
    /// Total comment count
    pub descendants: i64,
}

impl Story {
    /// Returns the external link, or the discussion page when there is none
    pub fn resolved_url(&self, id: u64) -> String {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}?id={}", HN_ITEM_URL, id),
        }
    }

    /// Formats the creation time as e.g. `Nov 14, 2023` (UTC)
    pub fn formatted_date(&self) -> String {
        DateTime::from_timestamp(self.time, 0)
            .unwrap_or_default()
            .format("%b %-d, %Y")
            .to_string()
    }
}
