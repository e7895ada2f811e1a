//! Runtime configuration shared by the fetch and image components
//!
//! Everything the pipeline needs is carried in an explicit [`FeedConfig`] that is
//! built once at startup and handed to each component. No component reads the
//! process environment on its own.

use std::path::PathBuf;
use std::time::Duration;

/// Base URL for the Hacker News Firebase API
pub const HN_API_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Base URL for the Gemini generative language API
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini model used for illustration
pub const GEMINI_MODEL: &str = "gemini-2.5-flash-image";

/// Default directory for cached API payloads
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Default directory for generated illustrations
pub const DEFAULT_IMAGE_DIR: &str = "headline_images_nano_banana";

/// File name of the shipped placeholder illustration
pub const DEFAULT_IMAGE_NAME: &str = "default.png";

/// Placeholder replaced by the story title in the prompt template
pub const TITLE_PLACEHOLDER: &str = "{title}";

/// Prompt used to illustrate a story headline
pub const DEFAULT_PROMPT_TEMPLATE: &str = "{title} showcased in a gritty noir comic book splash page. \
High contrast chiaroscuro lighting, heavy ink lines, dramatic angle. \
Full bleed, edge-to-edge artwork, masterpiece.";

/// Timeout applied to content API requests
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to image generation requests
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a single feed run
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Gemini API key; `None` disables image generation
    pub api_key: Option<String>,
    /// Skip the cache short-circuit and always try the network first
    pub force_refresh: bool,
    /// Write a fixed local image instead of calling the generation API
    pub test_mode: bool,
    /// Directory holding cached API payloads
    pub cache_dir: PathBuf,
    /// Directory holding generated illustrations
    pub image_dir: PathBuf,
    /// Path returned whenever no illustration could be produced
    pub default_image: PathBuf,
    /// Base URL of the content API
    pub api_base_url: String,
    /// Base URL of the image generation API
    pub image_api_base_url: String,
    /// Image generation model name
    pub image_model: String,
    /// Prompt template, `{title}` is replaced by the story title
    pub prompt_template: String,
    /// Timeout for each content API request
    pub fetch_timeout: Duration,
    /// Timeout for each image generation request
    pub image_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let image_dir = PathBuf::from(DEFAULT_IMAGE_DIR);
        Self {
            api_key: None,
            force_refresh: false,
            test_mode: false,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            default_image: image_dir.join(DEFAULT_IMAGE_NAME),
            image_dir,
            api_base_url: HN_API_BASE_URL.to_string(),
            image_api_base_url: GEMINI_API_BASE_URL.to_string(),
            image_model: GEMINI_MODEL.to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }
}

impl FeedConfig {
    /// Returns a config whose cache, image and default image paths live under `root`
    ///
    /// Useful for tests and for running several feeds side by side.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let image_dir = root.join(DEFAULT_IMAGE_DIR);
        Self {
            cache_dir: root.join(DEFAULT_CACHE_DIR),
            default_image: image_dir.join(DEFAULT_IMAGE_NAME),
            image_dir,
            ..Self::default()
        }
    }

    /// Returns the configured API key, treating an empty string as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Creates the cache and image directories
    ///
    /// Failures are logged and otherwise ignored; the fetch and image layers
    /// already degrade when their directories are unusable.
    pub fn ensure_directories(&self) {
        for dir in [&self.cache_dir, &self.image_dir] {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to create directory");
            }
        }
    }
}
