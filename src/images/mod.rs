//! Story illustrations
//!
//! Illustrations are generated once per story id, stored as `<id>.jpg` in the
//! image directory, and evicted once they are older than thirty days.

pub mod gemini;
pub mod materializer;
pub mod retention;

pub use gemini::{GeminiClient, GenerateError, GeneratedImage};
pub use materializer::{Materializer, ARTIFACT_EXTENSION};
pub use retention::{sweep_expired, ARTIFACT_RETENTION};
