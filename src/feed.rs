//! Feed assembly
//!
//! Walks the best-stories ranking, fetches each story, attaches an illustration
//! and wraps the result in the JSON envelope printed by the binary.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{FeedConfig, TITLE_PLACEHOLDER};
use crate::data::{StoriesClient, Story};
use crate::images::Materializer;

/// Version tag of the response schema
pub const SCHEMA_VERSION: &str = "1.0";

/// A story as presented in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedStory {
    pub story_title: String,
    pub story_url: String,
    pub story_image: String,
    pub story_timestamp: String,
    pub story_id: u64,
    pub story_score: i64,
}

/// Metadata block of a feed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_count: usize,
    /// RFC 3339 generation time
    pub last_updated: String,
    pub version: String,
}

/// The document emitted once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub stories: Vec<FormattedStory>,
    pub metadata: Metadata,
}

impl FeedResponse {
    /// Wraps `stories` with metadata stamped at the current time
    pub fn new(stories: Vec<FormattedStory>) -> Self {
        let metadata = Metadata {
            total_count: stories.len(),
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            version: SCHEMA_VERSION.to_string(),
        };
        Self { stories, metadata }
    }
}

/// Builds the illustrated story feed
#[derive(Debug, Clone)]
pub struct Feed {
    stories: StoriesClient,
    materializer: Materializer,
    /// Illustration prompt, `{title}` is replaced by the story title
    prompt_template: String,
}

impl Feed {
    /// Creates a feed with clients built from `config`
    pub fn new(config: &FeedConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_clients(
            StoriesClient::new(config)?,
            Materializer::new(config)?,
            config.prompt_template.clone(),
        ))
    }

    /// Creates a feed from pre-built clients
    pub fn with_clients(
        stories: StoriesClient,
        materializer: Materializer,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            stories,
            materializer,
            prompt_template: prompt_template.into(),
        }
    }

    /// Renders the illustration prompt for a story title
    pub fn prompt_for(&self, title: &str) -> String {
        self.prompt_template.replace(TITLE_PLACEHOLDER, title)
    }

    /// Fetches and illustrates the top stories, in ranking order
    ///
    /// Stories that cannot be fetched are logged and left out. A failure to
    /// fetch the ranking itself yields an empty feed.
    pub async fn render(&self) -> Vec<FormattedStory> {
        let ids = match self.stories.fetch_ranked_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch best stories");
                return Vec::new();
            }
        };

        let mut stories = Vec::with_capacity(ids.len());
        for id in ids {
            let story = match self.stories.fetch_item(id).await {
                Ok(story) => story,
                Err(e) => {
                    tracing::warn!(id, error = %e, "failed to fetch story, skipping");
                    continue;
                }
            };
            stories.push(self.format_story(id, &story).await);
        }
        stories
    }

    /// Projects a fetched story into its feed form, materializing its illustration
    async fn format_story(&self, id: u64, story: &Story) -> FormattedStory {
        let prompt = self.prompt_for(&story.title);
        let image = self.materializer.materialize(&prompt, id).await;

        FormattedStory {
            story_title: story.title.clone(),
            story_url: story.resolved_url(id),
            story_image: image.to_string_lossy().into_owned(),
            story_timestamp: story.formatted_date(),
            story_id: id,
            story_score: story.score,
        }
    }
}
