//! Result classification for generated SQL.
//!
//! Normalizes an LLM reply, runs exactly one engine check chosen by the
//! validation strategy, and turns the engine's answer into a
//! [`GenerationOutcome`]. Retrying with a repaired candidate is the caller's
//! job.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::engine::{EngineSession, ExecuteOutcome, QueryEngine};
use crate::error::Result;
use crate::generation::normalize::extract_candidate;
use crate::generation::result::{
    FailureKind, GenerationOutcome, InvalidGenerationResult, ValidGenerationResult,
};
use crate::generation::strategy::{ClassifyRequest, ValidationTier};

/// Row limit for dry runs and previews.
const PREVIEW_LIMIT: u32 = 1;

/// Stateless classifier; share it freely across concurrent requests.
#[derive(Clone)]
pub struct ResultClassifier {
    engine: Arc<dyn QueryEngine>,
}

impl ResultClassifier {
    /// Creates a classifier backed by the given engine.
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    /// Classifies the first of `replies`.
    ///
    /// Never fails: any internal error is logged and reported as
    /// [`GenerationOutcome::Empty`].
    pub async fn run<S: AsRef<str> + Sync>(
        &self,
        replies: &[S],
        request: &ClassifyRequest,
    ) -> GenerationOutcome {
        match self.classify(replies, request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error in result classification: {}: {}", e.category(), e);
                GenerationOutcome::Empty
            }
        }
    }

    /// Like [`run`](Self::run), but gives up when `cancel` fires.
    ///
    /// A cancelled classification drops its in-flight engine request and
    /// session, and reports [`GenerationOutcome::Empty`].
    pub async fn run_with_cancel<S: AsRef<str> + Sync>(
        &self,
        replies: &[S],
        request: &ClassifyRequest,
        cancel: CancellationToken,
    ) -> GenerationOutcome {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                warn!("Result classification cancelled");
                GenerationOutcome::Empty
            }
            outcome = self.run(replies, request) => outcome,
        }
    }

    /// Classifies the first of `replies`, surfacing internal errors.
    pub async fn classify<S: AsRef<str> + Sync>(
        &self,
        replies: &[S],
        request: &ClassifyRequest,
    ) -> Result<GenerationOutcome> {
        let candidate = extract_candidate(replies)?;
        self.classify_candidate(&candidate, request).await
    }

    /// Classifies an already-normalized SQL candidate.
    pub async fn classify_candidate(
        &self,
        candidate: &str,
        request: &ClassifyRequest,
    ) -> Result<GenerationOutcome> {
        let tier = request.strategy.tier();
        debug!("Classifying candidate with {} tier", tier);

        let session = self.engine.open_session().await?;
        let outcome = match tier {
            ValidationTier::DryPlan { allow_fallback } => {
                dry_plan(session.as_ref(), candidate, &request.data_source, allow_fallback).await?
            }
            ValidationTier::DryRun => {
                let executed = session
                    .execute_sql(candidate, request.project_id.as_deref(), PREVIEW_LIMIT, true)
                    .await?;
                adjudicate_execution(candidate, executed, FailureKind::DryRun)
            }
            ValidationTier::Preview => {
                let executed = session
                    .execute_sql(candidate, request.project_id.as_deref(), PREVIEW_LIMIT, false)
                    .await?;
                let tier_kind = if executed.diagnostics.error_message.is_empty() {
                    FailureKind::PreviewEmptyData
                } else {
                    FailureKind::PreviewFailed
                };
                adjudicate_execution(candidate, executed, tier_kind)
            }
        };
        drop(session);

        if let GenerationOutcome::Invalid(invalid) = &outcome {
            warn!(
                "Candidate rejected by {} tier ({}): {}",
                tier, invalid.kind, invalid.error
            );
        }

        Ok(outcome)
    }
}

async fn dry_plan(
    session: &dyn EngineSession,
    candidate: &str,
    data_source: &str,
    allow_fallback: bool,
) -> Result<GenerationOutcome> {
    let planned = session
        .dry_plan(candidate, data_source, allow_fallback)
        .await?;

    if planned.success {
        return Ok(GenerationOutcome::Valid(ValidGenerationResult {
            sql: candidate.to_string(),
            correlation_id: String::new(),
        }));
    }

    // Dry plan failures carry neither the original SQL nor a correlation id.
    Ok(GenerationOutcome::Invalid(InvalidGenerationResult {
        sql: candidate.to_string(),
        original_sql: None,
        kind: FailureKind::resolve(FailureKind::DryPlan, &planned.error_message),
        error: planned.error_message,
        correlation_id: String::new(),
    }))
}

fn adjudicate_execution(
    candidate: &str,
    executed: ExecuteOutcome,
    tier_kind: FailureKind,
) -> GenerationOutcome {
    let diagnostics = executed.diagnostics;

    if executed.success {
        return GenerationOutcome::Valid(ValidGenerationResult {
            sql: candidate.to_string(),
            correlation_id: diagnostics.correlation_id,
        });
    }

    GenerationOutcome::Invalid(InvalidGenerationResult {
        sql: diagnostics
            .error_sql
            .unwrap_or_else(|| candidate.to_string()),
        original_sql: Some(candidate.to_string()),
        kind: FailureKind::resolve(tier_kind, &diagnostics.error_message),
        error: diagnostics.error_message,
        correlation_id: diagnostics.correlation_id,
    })
}
