//! sqlgate - Validation and failure classification for LLM-generated SQL.
//!
//! This library exposes the core modules for use by the binary and integration tests.

pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod logging;
