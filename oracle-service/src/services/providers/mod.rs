//! Vision provider abstraction and implementations.
//!
//! The gateway only sees [`VisionProvider`]; Gemini is the production backend
//! and the mock backs tests.

pub mod gemini;
pub mod mock;

use crate::models::ImagePayload;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// A remote vision-language model that can answer a prompt about one image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Ask the model about `image`, constraining output to JSON.
    ///
    /// Returns the raw text the model produced; callers parse it.
    async fn generate_json(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, ProviderError>;
}
