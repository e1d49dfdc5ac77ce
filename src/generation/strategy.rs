//! Validation strategy and tier selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DEFAULT_DATA_SOURCE;

/// Caller-facing switches that decide how a candidate is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStrategy {
    pub use_dry_plan: bool,
    pub allow_dry_plan_fallback: bool,
    pub allow_data_preview: bool,
}

impl Default for ValidationStrategy {
    fn default() -> Self {
        Self {
            use_dry_plan: false,
            allow_dry_plan_fallback: true,
            allow_data_preview: false,
        }
    }
}

impl ValidationStrategy {
    /// Static planning only, with the given fallback policy.
    pub fn dry_plan(allow_fallback: bool) -> Self {
        Self {
            use_dry_plan: true,
            allow_dry_plan_fallback: allow_fallback,
            ..Default::default()
        }
    }

    /// Limited execution without durable effects.
    pub fn dry_run() -> Self {
        Self::default()
    }

    /// Full execution that must return preview rows.
    pub fn preview() -> Self {
        Self {
            allow_data_preview: true,
            ..Default::default()
        }
    }

    /// Resolves the strategy to the single tier that will run.
    ///
    /// The dry plan switch wins; otherwise disabling data preview forces a
    /// dry run.
    pub fn tier(&self) -> ValidationTier {
        if self.use_dry_plan {
            ValidationTier::DryPlan {
                allow_fallback: self.allow_dry_plan_fallback,
            }
        } else if !self.allow_data_preview {
            ValidationTier::DryRun
        } else {
            ValidationTier::Preview
        }
    }
}

/// The one backend check a classification performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationTier {
    DryPlan { allow_fallback: bool },
    DryRun,
    Preview,
}

impl ValidationTier {
    /// Returns the tier name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DryPlan { .. } => "dry-plan",
            Self::DryRun => "dry-run",
            Self::Preview => "preview",
        }
    }
}

impl fmt::Display for ValidationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a classification needs besides the replies themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRequest {
    pub strategy: ValidationStrategy,
    pub project_id: Option<String>,
    pub data_source: String,
}

impl ClassifyRequest {
    /// Creates a request for the given strategy against the default data source.
    pub fn new(strategy: ValidationStrategy) -> Self {
        Self {
            strategy,
            project_id: None,
            data_source: DEFAULT_DATA_SOURCE.to_string(),
        }
    }

    /// Sets the project to execute against.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the data source identifier used by dry plans.
    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }
}

impl Default for ClassifyRequest {
    fn default() -> Self {
        Self::new(ValidationStrategy::default())
    }
}
