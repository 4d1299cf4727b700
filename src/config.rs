use serde::Deserialize;
use url::form_urlencoded;

use crate::domain::{errors::AppError, logging::LogLevel};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 30_000;

/// DOM id of the optional inline JSON configuration block.
pub const CONFIG_ELEMENT_ID: &str = "app-config";

/// Runtime configuration.
///
/// Sources, later ones winning: defaults, the inline
/// `<script id="app-config" type="application/json">` block, query parameters
/// (`api`, `timeout_ms`, `log`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u32,
    #[serde(deserialize_with = "deserialize_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            log_level: if cfg!(debug_assertions) { LogLevel::Debug } else { LogLevel::Info },
        }
    }
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("invalid configuration JSON: {e}")))?;
        config.validated()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Apply `?api=…&timeout_ms=…&log=…` overrides. Unknown keys are ignored.
    pub fn apply_query(self, query: &str) -> Result<Self, AppError> {
        let mut config = self;
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            config = match key.as_ref() {
                "api" => config.with_api_base_url(value),
                "timeout_ms" => {
                    let timeout = value
                        .parse()
                        .map_err(|_| AppError::Config(format!("timeout_ms must be a number, got '{value}'")))?;
                    config.with_timeout(timeout)
                }
                "log" => config.with_log_level(value.parse().map_err(AppError::Config)?),
                _ => config,
            };
        }
        config.validated()
    }

    fn validated(mut self) -> Result<Self, AppError> {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config("timeout_ms must be greater than zero".to_string()));
        }
        Ok(self)
    }
}
