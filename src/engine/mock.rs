//! Mock query engine for testing.
//!
//! Returns scripted outcomes and records every call, plus how many sessions
//! were opened and released.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::{
    DryPlanOutcome, EngineCall, EngineSession, ExecuteOutcome, PreviewData, QueryEngine,
};
use crate::error::{GateError, Result};

/// Mock engine that answers every request with a fixed outcome.
///
/// Clones share the same call journal, so a test can hand one clone to the
/// classifier and inspect the other.
#[derive(Debug, Clone)]
pub struct MockEngine {
    dry_plan: DryPlanOutcome,
    execute: ExecuteOutcome,
    session_error: Option<String>,
    call_error: Option<String>,
    latency: Option<Duration>,
    journal: Arc<Journal>,
}

#[derive(Debug, Default)]
struct Journal {
    calls: Mutex<Vec<EngineCall>>,
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl MockEngine {
    /// Creates a mock engine where every check succeeds.
    pub fn new() -> Self {
        Self {
            dry_plan: DryPlanOutcome::planned(),
            execute: ExecuteOutcome::succeeded("mock-correlation-id").with_data(PreviewData {
                columns: vec!["result".to_string()],
                data: vec![vec![serde_json::Value::from(1)]],
            }),
            session_error: None,
            call_error: None,
            latency: None,
            journal: Arc::default(),
        }
    }

    /// Sets the outcome returned by `dry_plan`.
    pub fn with_dry_plan(mut self, outcome: DryPlanOutcome) -> Self {
        self.dry_plan = outcome;
        self
    }

    /// Sets the outcome returned by `execute_sql`.
    pub fn with_execute(mut self, outcome: ExecuteOutcome) -> Self {
        self.execute = outcome;
        self
    }

    /// Makes `open_session` fail with the given message.
    pub fn with_session_error(mut self, message: impl Into<String>) -> Self {
        self.session_error = Some(message.into());
        self
    }

    /// Makes every session call fail with the given message.
    pub fn with_call_error(mut self, message: impl Into<String>) -> Self {
        self.call_error = Some(message.into());
        self
    }

    /// Delays every session call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.journal
            .calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Returns the number of sessions opened.
    pub fn sessions_opened(&self) -> usize {
        self.journal.opened.load(Ordering::SeqCst)
    }

    /// Returns the number of sessions dropped.
    pub fn sessions_released(&self) -> usize {
        self.journal.released.load(Ordering::SeqCst)
    }

    fn record(&self, call: EngineCall) {
        if let Ok(mut calls) = self.journal.calls.lock() {
            calls.push(call);
        }
    }

    async fn respond<T: Clone>(&self, outcome: &T) -> Result<T> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.call_error {
            Some(message) => Err(GateError::engine(message.clone())),
            None => Ok(outcome.clone()),
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryEngine for MockEngine {
    async fn open_session(&self) -> Result<Box<dyn EngineSession>> {
        if let Some(message) = &self.session_error {
            return Err(GateError::engine(message.clone()));
        }
        self.journal.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            engine: self.clone(),
        }))
    }
}

struct MockSession {
    engine: MockEngine,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.engine.journal.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngineSession for MockSession {
    async fn dry_plan(
        &self,
        sql: &str,
        data_source: &str,
        allow_fallback: bool,
    ) -> Result<DryPlanOutcome> {
        self.engine.record(EngineCall::DryPlan {
            sql: sql.to_string(),
            data_source: data_source.to_string(),
            allow_fallback,
        });
        self.engine.respond(&self.engine.dry_plan).await
    }

    async fn execute_sql(
        &self,
        sql: &str,
        project_id: Option<&str>,
        limit: u32,
        dry_run: bool,
    ) -> Result<ExecuteOutcome> {
        self.engine.record(EngineCall::Execute {
            sql: sql.to_string(),
            project_id: project_id.map(String::from),
            limit,
            dry_run,
        });
        self.engine.respond(&self.engine.execute).await
    }
}
