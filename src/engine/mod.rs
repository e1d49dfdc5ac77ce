//! Query engine abstraction for sqlgate.
//!
//! The classifier talks to an external query-execution service through
//! [`QueryEngine`]. Every classification opens exactly one [`EngineSession`]
//! and drops it when the classification ends, on every exit path.

mod http;
mod mock;
mod types;

pub use http::{HttpEngine, HttpSession};
pub use mock::MockEngine;
pub use types::{DryPlanOutcome, EngineCall, ExecuteOutcome, ExecutionDiagnostics, PreviewData};

use async_trait::async_trait;

use crate::error::Result;

/// Prefix of every engine diagnostic that reports a request timeout.
pub const TIMEOUT_MARKER: &str = "Request timed out";

/// Factory for per-classification engine sessions.
///
/// Implementations must be thread-safe so a single engine can back any number
/// of concurrent classifications.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Opens a session scoped to one classification call.
    ///
    /// The session is released when the returned box is dropped.
    async fn open_session(&self) -> Result<Box<dyn EngineSession>>;
}

/// A network session against the query engine.
///
/// Backend failures are reported inside the returned outcomes. An `Err` means
/// the request could not be adjudicated at all.
#[async_trait]
pub trait EngineSession: Send + Sync {
    /// Checks that `sql` can be planned without executing it.
    async fn dry_plan(
        &self,
        sql: &str,
        data_source: &str,
        allow_fallback: bool,
    ) -> Result<DryPlanOutcome>;

    /// Executes `sql`, optionally as a dry run, returning at most `limit` rows.
    async fn execute_sql(
        &self,
        sql: &str,
        project_id: Option<&str>,
        limit: u32,
        dry_run: bool,
    ) -> Result<ExecuteOutcome>;
}
