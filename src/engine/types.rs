//! Outcome types returned by query engine sessions.
//!
//! Backend failures are data, not errors: a failed plan or execution is
//! reported through these structs so the classifier can adjudicate it.

use serde::{Deserialize, Serialize};

/// Result of a static dry plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryPlanOutcome {
    /// Whether the engine could plan the statement.
    pub success: bool,
    /// Engine diagnostic text; empty on success.
    pub error_message: String,
}

impl DryPlanOutcome {
    /// Creates a successful dry plan outcome.
    pub fn planned() -> Self {
        Self {
            success: true,
            error_message: String::new(),
        }
    }

    /// Creates a failed dry plan outcome with the engine's diagnostic.
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: error_message.into(),
        }
    }
}

/// Diagnostics supplied by the engine alongside an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDiagnostics {
    /// Engine diagnostic text; empty when the engine reported none.
    #[serde(default)]
    pub error_message: String,
    /// The statement the engine reports as offending, if it supplied one.
    #[serde(default)]
    pub error_sql: Option<String>,
    /// Opaque token for fetching cached preview rows later.
    #[serde(default)]
    pub correlation_id: String,
}

/// Preview rows returned by a non-dry execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewData {
    /// Column names, in result order.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Row values, one inner vector per row.
    #[serde(default)]
    pub data: Vec<Vec<serde_json::Value>>,
}

impl PreviewData {
    /// Returns true if no rows were returned.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Result of an `execute_sql` call.
///
/// `success` means "the engine accepted the statement" for dry runs and
/// "the engine returned rows" for preview executions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteOutcome {
    pub success: bool,
    pub data: Option<PreviewData>,
    pub diagnostics: ExecutionDiagnostics,
}

impl ExecuteOutcome {
    /// Creates a successful outcome with the given correlation id.
    pub fn succeeded(correlation_id: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            diagnostics: ExecutionDiagnostics {
                correlation_id: correlation_id.into(),
                ..Default::default()
            },
        }
    }

    /// Creates a failed outcome carrying the engine's diagnostics.
    pub fn failed(diagnostics: ExecutionDiagnostics) -> Self {
        Self {
            success: false,
            data: None,
            diagnostics,
        }
    }

    /// Attaches preview rows to the outcome.
    pub fn with_data(mut self, data: PreviewData) -> Self {
        self.data = Some(data);
        self
    }
}

/// A single request made against an engine session, as recorded by mocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    DryPlan {
        sql: String,
        data_source: String,
        allow_fallback: bool,
    },
    Execute {
        sql: String,
        project_id: Option<String>,
        limit: u32,
        dry_run: bool,
    },
}
