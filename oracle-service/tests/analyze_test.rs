//! Integration tests for `POST /analyze`.
//!
//! The vision provider is a mock, so no network access or API key is needed.

mod common;

use common::{image_form, spawn_app, spawn_app_with, test_config, CLIENT_KEY, JPEG_BYTES};
use oracle_service::services::providers::mock::MockVisionProvider;
use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

const ANALYSIS_JSON: &str =
    r#"{"riskScore": 82, "bottlenecks": ["berth 4 congestion"], "mitigation": "divert to berth 6"}"#;

#[tokio::test]
async fn missing_api_key_returns_401_without_remote_call() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "detail": "X-API-Key header is missing" }));
    assert_eq!(app.provider.call_count().await, 0);
}

#[tokio::test]
async fn empty_api_key_is_treated_as_missing() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(""))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.provider.call_count().await, 0);
}

#[tokio::test]
async fn missing_api_key_wins_over_malformed_body() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .body("not multipart")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_request_returns_model_json_verbatim() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(CLIENT_KEY))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let expected: serde_json::Value = serde_json::from_str(ANALYSIS_JSON).unwrap();
    assert_eq!(body, expected);
}

#[tokio::test]
async fn image_bytes_and_mime_type_reach_provider_unmodified() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    let response = app
        .post_analyze(image_form(&png, "image/png"), Some(CLIENT_KEY))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = app.provider.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].data, png.to_vec());
    assert_eq!(calls[0].mime_type, "image/png");
}

#[tokio::test]
async fn other_form_fields_are_ignored() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;
    let form = multipart::Form::new()
        .text("note", "ignored")
        .part(
            "file",
            multipart::Part::bytes(JPEG_BYTES.to_vec())
                .file_name("yard.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        );

    let response = app.post_analyze(form, Some(CLIENT_KEY)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.provider.calls().await[0].data, JPEG_BYTES.to_vec());
}

#[tokio::test]
async fn provider_failure_returns_500_with_detail() {
    let app = spawn_app(MockVisionProvider::failing("upstream unreachable")).await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(CLIENT_KEY))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "detail": "Network error: upstream unreachable" }));
    assert_eq!(app.provider.call_count().await, 1);
}

#[tokio::test]
async fn non_json_model_output_returns_500() {
    let app = spawn_app(MockVisionProvider::responding("RISK: LOW. SEALS INTACT.")).await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(CLIENT_KEY))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Model output is not valid JSON"));
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn slow_provider_returns_500_after_timeout() {
    let mut config = test_config();
    config.gateway.request_timeout = Duration::from_millis(100);
    let app = spawn_app_with(
        config,
        MockVisionProvider::responding(ANALYSIS_JSON).with_delay(Duration::from_secs(2)),
    )
    .await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(CLIENT_KEY))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("did not respond"));
}

#[tokio::test]
async fn same_image_twice_makes_two_remote_calls() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    for _ in 0..2 {
        let response = app
            .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(CLIENT_KEY))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.provider.call_count().await, 2);
}

#[tokio::test]
async fn missing_file_field_returns_422() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;
    let form = multipart::Form::new().text("image", "not a file");

    let response = app.post_analyze(form, Some(CLIENT_KEY)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Multipart field 'file' is required");
    assert_eq!(app.provider.call_count().await, 0);
}

#[tokio::test]
async fn empty_upload_returns_500_without_remote_call() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .post_analyze(image_form(&[], "image/jpeg"), Some(CLIENT_KEY))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Uploaded file is empty");
    assert_eq!(app.provider.call_count().await, 0);
}

#[tokio::test]
async fn oversized_upload_returns_500_without_remote_call() {
    let mut config = test_config();
    config.gateway.max_upload_bytes = 1024;
    let app = spawn_app_with(config, MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .post_analyze(image_form(&vec![0u8; 8 * 1024], "image/jpeg"), Some(CLIENT_KEY))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.provider.call_count().await, 0);
}

#[tokio::test]
async fn client_key_check_can_be_disabled() {
    let mut config = test_config();
    config.gateway.require_client_key = false;
    let app = spawn_app_with(config, MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.provider.call_count().await, 1);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .header("x-request-id", "trace-me")
        .header("X-API-Key", CLIENT_KEY)
        .multipart(image_form(JPEG_BYTES, "image/jpeg"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn non_ascii_api_key_counts_as_present() {
    let app = spawn_app(MockVisionProvider::responding(ANALYSIS_JSON)).await;

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .header(
            "X-API-Key",
            reqwest::header::HeaderValue::from_bytes("clé-secrète".as_bytes()).unwrap(),
        )
        .multipart(image_form(JPEG_BYTES, "image/jpeg"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.provider.call_count().await, 1);
}

#[tokio::test]
async fn non_object_json_is_relayed_unchanged() {
    for answer in [r#"[1, 2]"#, r#""ok""#, "42"] {
        let app = spawn_app(MockVisionProvider::responding(answer)).await;

        let response = app
            .post_analyze(image_form(JPEG_BYTES, "image/jpeg"), Some(CLIENT_KEY))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::from_str::<serde_json::Value>(answer).unwrap());
    }
}
