//! Command-line interface parsing for noirfeed
//!
//! Every flag can also be supplied through an environment variable, which is
//! how the feed is usually configured when run from a scheduler.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{FeedConfig, DEFAULT_CACHE_DIR, DEFAULT_IMAGE_DIR, DEFAULT_IMAGE_NAME};

/// noirfeed - Illustrated Hacker News best stories as JSON
#[derive(Parser, Debug)]
#[command(name = "noirfeed")]
#[command(about = "Fetch the best Hacker News stories and illustrate them as noir comic panels")]
#[command(version)]
pub struct Cli {
    /// Gemini API key used for image generation
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Ignore cached payloads and fetch from the network first
    #[arg(long, env = "FORCE_UPDATE", value_parser = parse_env_flag)]
    pub force_refresh: bool,

    /// Write a placeholder JPEG instead of calling the image API
    #[arg(long, env = "TEST_MODE", value_parser = parse_env_flag)]
    pub test_mode: bool,

    /// Directory for cached API payloads
    #[arg(long, env = "NOIRFEED_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Directory for generated illustrations
    #[arg(long, env = "NOIRFEED_IMAGE_DIR", default_value = DEFAULT_IMAGE_DIR)]
    pub image_dir: PathBuf,

    /// Image path used when no illustration can be produced
    /// [default: <IMAGE_DIR>/default.png]
    #[arg(long, value_name = "PATH")]
    pub default_image: Option<PathBuf>,

    /// Print the JSON document on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Parses a boolean flag value coming from the environment
///
/// Only the exact value `true` enables the flag. Anything else (`1`, `yes`,
/// `TRUE`, garbage) leaves it off rather than aborting the run.
pub fn parse_env_flag(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

impl Cli {
    /// Builds the feed configuration from parsed CLI arguments
    pub fn to_config(&self) -> FeedConfig {
        FeedConfig {
            api_key: self.api_key.clone(),
            force_refresh: self.force_refresh,
            test_mode: self.test_mode,
            cache_dir: self.cache_dir.clone(),
            image_dir: self.image_dir.clone(),
            default_image: self
                .default_image
                .clone()
                .unwrap_or_else(|| self.image_dir.join(DEFAULT_IMAGE_NAME)),
            ..FeedConfig::default()
        }
    }
}
