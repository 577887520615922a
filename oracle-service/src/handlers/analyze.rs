use crate::models::{AnalysisError, AnalysisRequest, AnalysisResult};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::HeaderMap,
    Json,
};
use service_core::error::AppError;

/// Header carrying the caller's credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Multipart field holding the image.
pub const FILE_FIELD: &str = "file";

/// `POST /analyze`
///
/// The credential check runs before the body is touched, so a request without
/// `X-API-Key` is always a 401 regardless of what it uploads.
pub async fn analyze_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    // Presence is judged on the raw bytes; non-ASCII keys still count.
    let api_key = headers
        .get(API_KEY_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    state.gateway.authorize(api_key.as_deref())?;

    let mut multipart = multipart.map_err(|e| {
        AppError::UnprocessableEntity(anyhow::anyhow!("Expected a multipart upload: {}", e))
    })?;

    let (image_bytes, mime_type) = read_file_field(&mut multipart).await?;

    let result = state
        .gateway
        .submit(AnalysisRequest {
            image_bytes,
            mime_type,
            api_key,
        })
        .await?;

    Ok(Json(result))
}

/// Find the `file` field and read it fully; other fields are skipped.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<(Vec<u8>, Option<String>), AppError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read multipart upload");
            AnalysisError::Upstream(format!("Failed to read uploaded file: {}", e))
        })?;

        let Some(field) = field else {
            return Err(AppError::UnprocessableEntity(anyhow::anyhow!(
                "Multipart field '{}' is required",
                FILE_FIELD
            )));
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let mime_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read uploaded file bytes");
            AnalysisError::Upstream(format!("Failed to read uploaded file: {}", e))
        })?;

        return Ok((data.to_vec(), mime_type));
    }
}
