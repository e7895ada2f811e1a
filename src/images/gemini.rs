//! Gemini image generation API client
//!
//! Sends a text prompt to the `generateContent` endpoint of an image-capable
//! Gemini model and extracts the first inline image from the response.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Aspect ratio requested for every illustration
pub const ASPECT_RATIO: &str = "4:3";

/// Errors that can occur when generating an image
#[derive(Debug, Error)]
pub enum GenerateError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The response carried no inline image
    #[error("No image data in response (HTTP {status}): {body}")]
    NoImage { status: u16, body: String },

    /// The inline image was not valid base64
    #[error("Failed to decode image data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

/// Response from `generateContent`
///
/// Every level defaults to empty, so a response without candidates or parts
/// parses fine and is reported as "no image" instead of a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InlineData {
    data: String,
    mime_type: String,
}

/// A decoded image returned by the API
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GenerateResponse {
    /// Returns the first inline image of the first candidate
    fn into_inline_data(self) -> Option<InlineData> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
    }
}

/// Client for the Gemini image generation API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Creates a new client for `model` under `base_url`
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Generates an image for `prompt`
    ///
    /// # Returns
    /// * `Ok(GeneratedImage)` - Decoded image bytes and their MIME type
    /// * `Err(GenerateError)` - Transport, parse, missing-image or base64 failure
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage, GenerateError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio: ASPECT_RATIO,
                },
            },
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(GenerateError::RequestFailed)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(GenerateError::Body)?;

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let inline = parsed
            .into_inline_data()
            .ok_or(GenerateError::NoImage { status, body: text })?;

        Ok(GeneratedImage {
            bytes: STANDARD.decode(inline.data.as_bytes())?,
            mime_type: inline.mime_type,
        })
    }
}
