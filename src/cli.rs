//! Command-line argument parsing for sqlgate.

use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

use sqlgate::config::Config;
use sqlgate::error::{GateError, Result};

/// Validates an LLM-generated SQL reply against a query engine.
#[derive(Parser, Debug)]
#[command(name = "sqlgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Raw LLM reply (plain SQL, fenced SQL, or {"sql": ...}). Reads stdin if omitted.
    #[arg(long, value_name = "TEXT", conflicts_with = "reply_file")]
    pub reply: Option<String>,

    /// Read the raw LLM reply from a file (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub reply_file: Option<PathBuf>,

    /// Validate with a static dry plan instead of executing
    #[arg(long)]
    pub dry_plan: bool,

    /// Forbid the engine's fallback planner during dry plans
    #[arg(long)]
    pub no_fallback: bool,

    /// Execute the query and require preview rows
    #[arg(long, conflicts_with = "dry_plan")]
    pub preview: bool,

    /// Project to execute against
    #[arg(long, value_name = "ID")]
    pub project_id: Option<String>,

    /// Data source identifier for dry plans (e.g., "local_file", "postgres")
    #[arg(long, value_name = "NAME")]
    pub data_source: Option<String>,

    /// Query engine base URL
    #[arg(long, value_name = "URL", env = "SQLGATE_ENGINE_URL")]
    pub engine_url: Option<String>,

    /// Engine request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path (custom or default).
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies CLI overrides on top of the file configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.engine_url {
            config.engine.base_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.engine.timeout_secs = timeout;
        }
        if self.log_file {
            config.logging.file = true;
        }

        let validation = &mut config.validation;
        if self.dry_plan {
            validation.use_dry_plan = true;
        }
        if self.no_fallback {
            validation.allow_dry_plan_fallback = false;
        }
        if self.preview {
            validation.use_dry_plan = false;
            validation.allow_data_preview = true;
        }
        if let Some(project_id) = &self.project_id {
            validation.project_id = Some(project_id.clone());
        }
        if let Some(data_source) = &self.data_source {
            validation.data_source = data_source.clone();
        }
    }

    /// Reads the raw reply from the argument, a file, or stdin.
    pub fn read_reply(&self) -> Result<String> {
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }

        match &self.reply_file {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path).map_err(|e| {
                GateError::config(format!("Failed to read reply file {}: {e}", path.display()))
            }),
            _ => {
                let mut reply = String::new();
                std::io::stdin()
                    .read_to_string(&mut reply)
                    .map_err(|e| GateError::config(format!("Failed to read stdin: {e}")))?;
                Ok(reply)
            }
        }
    }
}
