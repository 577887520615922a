use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default vision model.
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Credential for the remote vision model. Never logged.
    pub api_key: Secret<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub vision_model: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Upper bound on a single remote analysis call.
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Reject `/analyze` calls that carry no `X-API-Key` header.
    pub require_client_key: bool,
    /// CORS origins; `*` allows any.
    pub allowed_origins: Vec<String>,
}

impl OracleConfig {
    /// Load from the process environment (after `.env`).
    ///
    /// Fails when `GOOGLE_API_KEY` is missing or blank: the service must not
    /// start without a credential for the remote provider.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY is required but not set"))
            })?;

        let request_timeout_secs: u64 = parse_env(
            &lookup,
            "ORACLE_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        if request_timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ORACLE_REQUEST_TIMEOUT_SECS must be greater than zero"
            )));
        }

        Ok(OracleConfig {
            common,
            google: GoogleConfig {
                api_key: Secret::new(api_key),
                base_url: get_env(&lookup, "ORACLE_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            },
            models: ModelConfig {
                vision_model: get_env(&lookup, "ORACLE_MODEL", DEFAULT_VISION_MODEL),
            },
            gateway: GatewayConfig {
                request_timeout: Duration::from_secs(request_timeout_secs),
                max_upload_bytes: parse_env(
                    &lookup,
                    "ORACLE_MAX_UPLOAD_BYTES",
                    DEFAULT_MAX_UPLOAD_BYTES,
                )?,
                require_client_key: parse_env(&lookup, "ORACLE_REQUIRE_CLIENT_KEY", true)?,
                allowed_origins: parse_origins(&get_env(&lookup, "ORACLE_ALLOWED_ORIGINS", "*")),
            },
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(raw) if !raw.is_empty() => raw.parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        _ => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
