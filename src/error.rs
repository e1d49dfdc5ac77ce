//! Error types for sqlgate.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for sqlgate operations.
#[derive(Error, Debug)]
pub enum GateError {
    /// The LLM reply could not be turned into a SQL candidate
    /// (missing reply, broken JSON envelope, missing `sql` key).
    #[error("Candidate error: {0}")]
    Candidate(String),

    /// Query engine transport errors (client setup, unreachable host, bad payloads).
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration errors (invalid config file, bad engine URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GateError {
    /// Creates a candidate error with the given message.
    pub fn candidate(msg: impl Into<String>) -> Self {
        Self::Candidate(msg.into())
    }

    /// Creates an engine error with the given message.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Candidate(_) => "Candidate Error",
            Self::Engine(_) => "Engine Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using GateError.
pub type Result<T> = std::result::Result<T, GateError>;
