//! Per-story illustration materialization
//!
//! Maps a story id to an image file on disk, generating it on first use and
//! reusing it afterwards. Every failure degrades to the shared placeholder
//! image, so a missing illustration never drops a story from the feed.

use std::path::{Path, PathBuf};

use super::gemini::GeminiClient;
use super::retention::{sweep_expired, ARTIFACT_RETENTION};
use crate::cache::write_atomic;
use crate::config::FeedConfig;

/// File extension of generated illustrations
pub const ARTIFACT_EXTENSION: &str = "jpg";

/// 1x1 baseline JPEG written in test mode
pub const TEST_JPEG: &[u8] = &[
    0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xff, 0xdb, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06, 0x05, 0x08,
    0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0a, 0x0c, 0x14, 0x0d, 0x0c, 0x0b, 0x0b, 0x0c, 0x19, 0x12,
    0x13, 0x0f, 0x14, 0x1d, 0x1a, 0x1f, 0x1e, 0x1d, 0x1a, 0x1c, 0x1c, 0x20, 0x24, 0x2e, 0x27, 0x20,
    0x22, 0x2c, 0x23, 0x1c, 0x1c, 0x28, 0x37, 0x29, 0x2c, 0x30, 0x31, 0x34, 0x34, 0x34, 0x1f, 0x27,
    0x39, 0x3d, 0x38, 0x32, 0x3c, 0x2e, 0x33, 0x34, 0x32, 0xff, 0xc0, 0x00, 0x0b, 0x08, 0x00, 0x01,
    0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xff, 0xc4, 0x00, 0x1f, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
    0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0xff, 0xc4, 0x00, 0xb5, 0x10, 0x00, 0x02, 0x01, 0x03,
    0x03, 0x02, 0x04, 0x03, 0x05, 0x05, 0x04, 0x04, 0x00, 0x00, 0x01, 0x7d, 0x01, 0x02, 0x03, 0x00,
    0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32,
    0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0, 0x24, 0x33, 0x62, 0x72,
    0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x34, 0x35,
    0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55,
    0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75,
    0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x92, 0x93, 0x94,
    0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2,
    0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9,
    0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6,
    0xe7, 0xe8, 0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0xff, 0xda,
    0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3f, 0x00, 0xfb, 0xd5, 0xdb, 0x20, 0xa8, 0xf1, 0x7e, 0xe9,
    0xf3, 0x61, 0xa0, 0x7f, 0xff, 0xd9,
];

/// How illustrations are produced when none exists yet
#[derive(Debug, Clone)]
enum Generator {
    /// Write [`TEST_JPEG`] without any network access
    Test,
    /// No API key configured
    Disabled,
    Gemini(GeminiClient),
}

/// Resolves story ids to illustration files
#[derive(Debug, Clone)]
pub struct Materializer {
    image_dir: PathBuf,
    default_image: PathBuf,
    generator: Generator,
}

impl Materializer {
    /// Creates a materializer from the feed configuration
    ///
    /// Test mode takes precedence over the API key. Fails only if the
    /// generation client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, reqwest::Error> {
        let generator = if config.test_mode {
            Generator::Test
        } else {
            match config.api_key() {
                Some(key) => Generator::Gemini(GeminiClient::new(
                    config.image_api_base_url.clone(),
                    config.image_model.clone(),
                    key,
                    config.image_timeout,
                )?),
                None => Generator::Disabled,
            }
        };
        Ok(Self {
            image_dir: config.image_dir.clone(),
            default_image: config.default_image.clone(),
            generator,
        })
    }

    /// Returns the illustration path for `id`, whether or not it exists yet
    pub fn artifact_path(&self, id: u64) -> PathBuf {
        self.image_dir.join(format!("{}.{}", id, ARTIFACT_EXTENSION))
    }

    /// Returns the path of an illustration for story `id`
    ///
    /// # Behavior
    /// - Expired illustrations are swept from the image directory first
    /// - An existing illustration for `id` is returned as-is, whatever `prompt` is
    /// - In test mode a fixed JPEG is written instead of calling the API
    /// - Without an API key, or on any generation failure, the placeholder path
    ///   is returned and no file is created
    pub async fn materialize(&self, prompt: &str, id: u64) -> PathBuf {
        let removed = sweep_expired(&self.image_dir, ARTIFACT_EXTENSION, ARTIFACT_RETENTION);
        if removed > 0 {
            tracing::info!(removed, "evicted expired illustrations");
        }

        let path = self.artifact_path(id);
        if path.exists() {
            return path;
        }

        let client = match &self.generator {
            Generator::Test => {
                tracing::info!(path = %path.display(), "test mode: writing placeholder JPEG");
                return self.store(&path, TEST_JPEG);
            }
            Generator::Disabled => {
                tracing::warn!("GEMINI_API_KEY not set, using default image");
                return self.default_image.clone();
            }
            Generator::Gemini(client) => client,
        };

        tracing::info!(id, "generating illustration");
        match client.generate(prompt).await {
            Ok(image) => {
                tracing::debug!(id, mime_type = %image.mime_type, bytes = image.bytes.len(), "received illustration");
                self.store(&path, &image.bytes)
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "image generation failed, using default image");
                self.default_image.clone()
            }
        }
    }

    /// Writes `bytes` to `path`, falling back to the placeholder on failure
    fn store(&self, path: &Path, bytes: &[u8]) -> PathBuf {
        match write_atomic(path, bytes) {
            Ok(()) => path.to_path_buf(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to write illustration");
                self.default_image.clone()
            }
        }
    }
}
