//! Classification results and the failure taxonomy.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::engine::TIMEOUT_MARKER;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The engine reported a request timeout.
    TimeOut,
    /// Static planning failed.
    DryPlan,
    /// Limited execution failed.
    DryRun,
    /// Execution succeeded but returned no rows.
    PreviewEmptyData,
    /// Execution failed while fetching preview rows.
    PreviewFailed,
}

impl FailureKind {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeOut => "TIME_OUT",
            Self::DryPlan => "DRY_PLAN",
            Self::DryRun => "DRY_RUN",
            Self::PreviewEmptyData => "PREVIEW_EMPTY_DATA",
            Self::PreviewFailed => "PREVIEW_FAILED",
        }
    }

    /// Picks the kind for a failure, letting a timeout diagnostic override
    /// the tier's own kind.
    pub fn resolve(tier_kind: FailureKind, error_message: &str) -> FailureKind {
        if error_message.starts_with(TIMEOUT_MARKER) {
            FailureKind::TimeOut
        } else {
            tier_kind
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidGenerationResult {
    pub sql: String,
    /// Empty when the engine supplied none (always for dry plans).
    pub correlation_id: String,
}

/// A candidate that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidGenerationResult {
    /// The engine's offending statement if it reported one, else the candidate.
    pub sql: String,
    /// The candidate as submitted. Absent for dry plan failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sql: Option<String>,
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub error: String,
    pub correlation_id: String,
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Valid(ValidGenerationResult),
    Invalid(InvalidGenerationResult),
    /// Classification could not complete; no diagnostic is available.
    Empty,
}

impl GenerationOutcome {
    /// Returns the valid result, if any.
    pub fn valid(&self) -> Option<&ValidGenerationResult> {
        match self {
            Self::Valid(result) => Some(result),
            _ => None,
        }
    }

    /// Returns the invalid result, if any.
    pub fn invalid(&self) -> Option<&InvalidGenerationResult> {
        match self {
            Self::Invalid(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Serializes as `{"valid_generation_result": .., "invalid_generation_result": ..}`
/// with `{}` standing in for the side that is not populated.
impl Serialize for GenerationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("valid_generation_result", &Side(self.valid()))?;
        map.serialize_entry("invalid_generation_result", &Side(self.invalid()))?;
        map.end()
    }
}

struct Side<'a, T>(Option<&'a T>);

impl<T: Serialize> Serialize for Side<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}
