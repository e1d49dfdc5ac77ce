//! Logging setup for sqlgate.
//!
//! Logs go to stderr by default so stdout stays clean for the JSON verdict.
//! The `[logging]` config section sets the level and can redirect output to
//! a file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Where log output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `RUST_LOG` first, then the configured level, then `info`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber described by `config`.
///
/// Falls back to stderr if the log file cannot be created.
pub fn init(config: &LoggingConfig) -> LogTarget {
    let filter = env_filter(&config.level);

    if config.file {
        let path = log_file_path(config);
        match open_log_file(&path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .init();
                return LogTarget::File(path);
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {}: {e}", path.display());
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    LogTarget::Stderr
}

/// The configured log path, or the platform default.
pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    config.path.clone().unwrap_or_else(default_log_path)
}

/// Creates the log file and its directory. Truncates output from earlier runs.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// `~/.local/state/sqlgate/sqlgate.log` on Linux, the state or config
/// directory elsewhere.
fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("sqlgate").join("sqlgate.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("sqlgate.log"))
}
