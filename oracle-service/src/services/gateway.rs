//! Image analysis gateway.
//!
//! Mediates between an HTTP caller and the remote vision model: checks that a
//! credential is present, forwards the image with a fixed instruction, and
//! parses the model's answer as JSON. Holds no per-request state.

use crate::config::GatewayConfig;
use crate::models::analysis::has_credential;
use crate::models::{AnalysisError, AnalysisRequest, AnalysisResult};
use crate::services::providers::VisionProvider;
use std::sync::Arc;
use std::time::Duration;

/// Instruction sent alongside every image.
pub const ANALYSIS_PROMPT: &str =
    "Analyze this logistics imagery for risk score (0-100), bottlenecks, and mitigation. Return JSON.";

pub struct ImageAnalysisGateway {
    provider: Arc<dyn VisionProvider>,
    request_timeout: Duration,
    require_client_key: bool,
}

impl ImageAnalysisGateway {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        request_timeout: Duration,
        require_client_key: bool,
    ) -> Self {
        Self {
            provider,
            request_timeout,
            require_client_key,
        }
    }

    pub fn from_config(config: &GatewayConfig, provider: Arc<dyn VisionProvider>) -> Self {
        Self::new(
            provider,
            config.request_timeout,
            config.require_client_key,
        )
    }

    /// Presence-only credential check. The key's value is never validated.
    pub fn authorize(&self, api_key: Option<&str>) -> Result<(), AnalysisError> {
        if self.require_client_key && !has_credential(api_key) {
            tracing::warn!("Rejected analysis request without X-API-Key header");
            return Err(AnalysisError::MissingCredential);
        }
        Ok(())
    }

    /// Run one analysis: authorize, call the model once, parse its JSON.
    ///
    /// Every failure after authorization is logged and reported as
    /// [`AnalysisError::Upstream`]. Nothing is retried.
    pub async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        self.authorize(request.api_key.as_deref())?;

        let payload = request.into_payload().map_err(|e| {
            tracing::error!(error = %e, "Rejected unreadable upload");
            e
        })?;

        tracing::info!(
            mime_type = %payload.mime_type,
            image_bytes = payload.data.len(),
            "Submitting image for analysis"
        );

        let call = self.provider.generate_json(ANALYSIS_PROMPT, &payload);
        let raw = match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Vision provider call failed");
                return Err(AnalysisError::Upstream(e.to_string()));
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.request_timeout.as_secs_f64(),
                    "Vision provider call timed out"
                );
                return Err(AnalysisError::Upstream(format!(
                    "Vision provider did not respond within {:?}",
                    self.request_timeout
                )));
            }
        };

        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!(error = %e, output_len = raw.len(), "Vision provider returned non-JSON output");
            AnalysisError::Upstream(format!("Model output is not valid JSON: {}", e))
        })?;

        Ok(AnalysisResult(value))
    }
}
