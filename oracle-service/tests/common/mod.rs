#![allow(dead_code)]

use oracle_service::config::{GatewayConfig, GoogleConfig, ModelConfig, OracleConfig};
use oracle_service::services::providers::mock::MockVisionProvider;
use oracle_service::services::providers::VisionProvider;
use oracle_service::startup::Application;
use reqwest::multipart;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

pub const CLIENT_KEY: &str = "client-key-123";

pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

pub fn test_config() -> OracleConfig {
    OracleConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        google: GoogleConfig {
            api_key: Secret::new("test-api-key".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        models: ModelConfig {
            vision_model: "gemini-2.0-flash".to_string(),
        },
        gateway: GatewayConfig {
            request_timeout: Duration::from_secs(5),
            max_upload_bytes: 1024 * 1024,
            require_client_key: true,
            allowed_origins: vec!["*".to_string()],
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub provider: Arc<MockVisionProvider>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_analyze(
        &self,
        form: multipart::Form,
        api_key: Option<&str>,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/analyze", self.address))
            .multipart(form);
        if let Some(key) = api_key {
            request = request.header("X-API-Key", key);
        }
        request.send().await.expect("Failed to execute request")
    }
}

/// Spawn the application on a random port backed by `provider`.
pub async fn spawn_app(provider: MockVisionProvider) -> TestApp {
    spawn_app_with(test_config(), provider).await
}

pub async fn spawn_app_with(config: OracleConfig, provider: MockVisionProvider) -> TestApp {
    let provider = Arc::new(provider);
    let address = spawn_with_provider(config, provider.clone()).await;

    TestApp {
        address,
        provider,
        client: reqwest::Client::new(),
    }
}

/// Spawn the application around any provider and return its base URL.
pub async fn spawn_with_provider(config: OracleConfig, provider: Arc<dyn VisionProvider>) -> String {
    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(app.run_until_stopped());

    format!("http://127.0.0.1:{}", port)
}

pub fn image_form(bytes: &[u8], mime_type: &str) -> multipart::Form {
    multipart::Form::new().part(
        "file",
        multipart::Part::bytes(bytes.to_vec())
            .file_name("dock.jpg")
            .mime_str(mime_type)
            .expect("valid mime type"),
    )
}
