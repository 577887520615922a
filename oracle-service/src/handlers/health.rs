use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const ROOT_MESSAGE: &str = "Sentinel-X Oracle Backend is running!";

/// `GET /` liveness probe. Never touches the vision provider.
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": ROOT_MESSAGE })))
}

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "oracle-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
