//! Configuration management for sqlgate.
//!
//! Handles loading configuration from TOML files and environment variables:
//! where the query engine lives and which validation strategy to use by default.

use crate::error::{GateError, Result};
use crate::generation::{ClassifyRequest, ValidationStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Data source assumed when none is configured.
pub const DEFAULT_DATA_SOURCE: &str = "local_file";

/// Main configuration structure for sqlgate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query engine connection settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default validation strategy.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Log level and destination.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query engine connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Base URL of the engine (e.g., "http://localhost:8080").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout per request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Path of the dry plan endpoint, relative to `base_url`.
    #[serde(default = "default_dry_plan_path")]
    pub dry_plan_path: String,

    /// Path of the query endpoint, relative to `base_url`.
    #[serde(default = "default_query_path")]
    pub query_path: String,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_dry_plan_path() -> String {
    "/v1/mdl/dry-plan".to_string()
}

fn default_query_path() -> String {
    "/v1/query".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            dry_plan_path: default_dry_plan_path(),
            query_path: default_query_path(),
        }
    }
}

impl EngineConfig {
    /// Creates a config pointing at the given base URL with default paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Resolves an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            GateError::config(format!("Invalid engine URL '{}': {e}", self.base_url))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(GateError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                base.scheme()
            )));
        }

        // Keep any path prefix on the base URL (e.g. "http://host/engine").
        let prefix = base.path().trim_end_matches('/').to_string();
        let mut url = base;
        url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));
        Ok(url)
    }

    /// Validates the base URL and both endpoint paths.
    pub fn validate(&self) -> Result<()> {
        self.endpoint(&self.dry_plan_path)?;
        self.endpoint(&self.query_path)?;
        if self.timeout_secs == 0 {
            return Err(GateError::config("Engine timeout must be at least 1 second"));
        }
        Ok(())
    }

    /// Applies `SQLGATE_ENGINE_URL` and `SQLGATE_ENGINE_TIMEOUT` overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var("SQLGATE_ENGINE_URL").ok(),
            std::env::var("SQLGATE_ENGINE_TIMEOUT").ok(),
        )
    }

    fn apply_overrides(&mut self, url: Option<String>, timeout: Option<String>) -> Result<()> {
        if let Some(url) = url {
            self.base_url = url;
        }
        if let Some(timeout) = timeout {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                GateError::config(format!(
                    "SQLGATE_ENGINE_TIMEOUT must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }
        Ok(())
    }
}

/// Default validation strategy applied when the caller does not override it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Check candidates with a static dry plan.
    #[serde(default)]
    pub use_dry_plan: bool,

    /// Let the engine fall back to a legacy planner during dry plans.
    #[serde(default = "default_true")]
    pub allow_dry_plan_fallback: bool,

    /// Execute candidates and require preview rows.
    #[serde(default)]
    pub allow_data_preview: bool,

    /// Target data source identifier for dry plans.
    #[serde(default = "default_data_source")]
    pub data_source: String,

    /// Project to execute against, if the engine is multi-project.
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_data_source() -> String {
    DEFAULT_DATA_SOURCE.to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            use_dry_plan: false,
            allow_dry_plan_fallback: default_true(),
            allow_data_preview: false,
            data_source: default_data_source(),
            project_id: None,
        }
    }
}

impl ValidationConfig {
    /// Returns the strategy described by this config.
    pub fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy {
            use_dry_plan: self.use_dry_plan,
            allow_dry_plan_fallback: self.allow_dry_plan_fallback,
            allow_data_preview: self.allow_data_preview,
        }
    }

    /// Builds a classification request from this config.
    pub fn to_request(&self) -> ClassifyRequest {
        let mut request =
            ClassifyRequest::new(self.strategy()).with_data_source(self.data_source.clone());
        if let Some(project_id) = &self.project_id {
            request = request.with_project_id(project_id.clone());
        }
        request
    }
}

/// Log level and destination.
///
/// `RUST_LOG` still takes precedence over `level` when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "sqlgate=debug".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a file instead of stderr.
    #[serde(default)]
    pub file: bool,

    /// Log file location; defaults to the platform state directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: false,
            path: None,
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlgate")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| GateError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            GateError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
