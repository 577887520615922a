//! Mock vision provider for testing.

use super::{ProviderError, VisionProvider};
use crate::models::ImagePayload;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;

enum MockOutcome {
    Respond(String),
    Fail(String),
}

/// Returns a canned answer (or error) and records every image it receives.
pub struct MockVisionProvider {
    outcome: MockOutcome,
    delay: Option<Duration>,
    calls: Mutex<Vec<ImagePayload>>,
}

impl MockVisionProvider {
    /// Answer every call with `text`.
    pub fn responding(text: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Respond(text.into()))
    }

    /// Fail every call with a network error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Fail(message.into()))
    }

    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Images received so far, in call order.
    pub async fn calls(&self) -> Vec<ImagePayload> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn generate_json(
        &self,
        _prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, ProviderError> {
        self.calls.lock().await.push(image.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            MockOutcome::Respond(text) => Ok(text.clone()),
            MockOutcome::Fail(message) => Err(ProviderError::NetworkError(message.clone())),
        }
    }
}
