//! Request, result and error types for a single image analysis exchange.

use axum::http::StatusCode;
use serde::Serialize;
use service_core::error::AppError;
use thiserror::Error;

/// An uploaded image plus whatever credential the caller sent.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image_bytes: Vec<u8>,

    /// Content type declared by the caller. Forwarded as-is.
    pub mime_type: Option<String>,

    /// Value of the `X-API-Key` header, if any.
    pub api_key: Option<String>,
}

impl AnalysisRequest {
    /// Whether a non-empty credential was supplied.
    pub fn has_credential(&self) -> bool {
        has_credential(self.api_key.as_deref())
    }

    /// Turn the upload into the payload handed to the vision provider.
    pub fn into_payload(self) -> Result<ImagePayload, AnalysisError> {
        if self.image_bytes.is_empty() {
            return Err(AnalysisError::Upstream(
                "Uploaded file is empty".to_string(),
            ));
        }

        let mime_type = self
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| {
                AnalysisError::Upstream("Uploaded file has no content type".to_string())
            })?;

        Ok(ImagePayload {
            data: self.image_bytes,
            mime_type,
        })
    }
}

pub(crate) fn has_credential(api_key: Option<&str>) -> bool {
    api_key.is_some_and(|k| !k.is_empty())
}

/// Image bytes and their declared MIME type, exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Whatever JSON the vision model produced.
///
/// Usually carries `riskScore`, `bottlenecks` and `mitigation`, but nothing
/// about its shape is enforced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub serde_json::Value);

impl AnalysisResult {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("X-API-Key header is missing")]
    MissingCredential,

    /// Reading the upload, calling the model or parsing its output failed.
    #[error("{0}")]
    Upstream(String),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::MissingCredential => StatusCode::UNAUTHORIZED,
            AnalysisError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::MissingCredential => AppError::Unauthorized(anyhow::anyhow!(
                AnalysisError::MissingCredential.message()
            )),
            AnalysisError::Upstream(message) => AppError::InternalError(anyhow::anyhow!(message)),
        }
    }
}
