//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use stockstats_analytics::{AlignConfig, DEFAULT_BUCKET_COUNT, MAX_BUCKET_COUNT};
use stockstats_core::types::{validate_minutes, DEFAULT_WINDOW_MINUTES};
use stockstats_data::{HttpSourceConfig, DEFAULT_BASE_URL};
use stockstats_engine::{EngineSettings, FetchPolicy};
use thiserror::Error;

/// Invalid values in an otherwise well-formed configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid engine setting `{field}`: {reason}")]
    Engine { field: &'static str, reason: String },

    #[error("Invalid logging setting: {0}")]
    Logging(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data_source: DataSourceConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.logging.validate()?;
        self.engine.to_settings()?;
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stockstats".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !self.is_json() && !self.format.eq_ignore_ascii_case("pretty") {
            return Err(SettingsError::Logging(format!(
                "format must be `pretty` or `json`, got `{}`",
                self.format
            )));
        }
        Ok(())
    }
}

/// Quote service connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSourceConfig {
    pub base_url: String,
    /// Name of the environment variable holding the bearer token
    pub token_env: String,
    pub request_timeout_ms: u64,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_env: "STOCKSTATS_API_TOKEN".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl DataSourceConfig {
    /// Bearer token from the configured environment variable, if set.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Client settings, including the token when one is available.
    pub fn to_http_config(&self) -> HttpSourceConfig {
        let config = HttpSourceConfig::new(self.base_url.clone())
            .with_timeout(Duration::from_millis(self.request_timeout_ms));
        match self.token() {
            Some(token) => config.with_token(token),
            None => config,
        }
    }
}

/// Engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub default_minutes: u32,
    pub fetch_timeout_ms: u64,
    pub deadline_ms: u64,
    pub bucket_count: usize,
    /// Fixed bucket width; replaces `bucket_count` when set
    pub bucket_width_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_WINDOW_MINUTES,
            fetch_timeout_ms: 5_000,
            deadline_ms: 15_000,
            bucket_count: DEFAULT_BUCKET_COUNT,
            bucket_width_secs: None,
        }
    }
}

impl EngineConfig {
    /// Convert to engine settings, rejecting values the engine cannot use.
    pub fn to_settings(&self) -> Result<EngineSettings, SettingsError> {
        let invalid = |field: &'static str, reason: String| SettingsError::Engine { field, reason };

        validate_minutes(self.default_minutes)
            .map_err(|e| invalid("default_minutes", e.to_string()))?;
        if self.fetch_timeout_ms == 0 {
            return Err(invalid("fetch_timeout_ms", "must be greater than 0".into()));
        }
        if self.deadline_ms < self.fetch_timeout_ms {
            return Err(invalid(
                "deadline_ms",
                format!("must be at least fetch_timeout_ms ({})", self.fetch_timeout_ms),
            ));
        }
        if self.bucket_count == 0 || self.bucket_count > MAX_BUCKET_COUNT {
            return Err(invalid(
                "bucket_count",
                format!("must be between 1 and {}", MAX_BUCKET_COUNT),
            ));
        }

        let align = match self.bucket_width_secs {
            Some(0) => return Err(invalid("bucket_width_secs", "must be greater than 0".into())),
            Some(secs) => {
                let width = i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .ok_or_else(|| invalid("bucket_width_secs", "out of range".into()))?;
                AlignConfig {
                    bucket_count: self.bucket_count,
                    bucket_width: Some(width),
                }
            }
            None => AlignConfig::with_bucket_count(self.bucket_count),
        };

        Ok(EngineSettings {
            default_minutes: self.default_minutes,
            fetch: FetchPolicy {
                per_fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
                deadline: Duration::from_millis(self.deadline_ms),
            },
            align,
        })
    }
}
