//! HTTP query engine client.
//!
//! Implements [`QueryEngine`] against a remote engine speaking JSON over HTTP.
//! Transport failures are folded into failed outcomes so the classifier can
//! report them; timeouts carry the [`TIMEOUT_MARKER`] prefix.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::config::EngineConfig;
use crate::engine::{
    DryPlanOutcome, EngineSession, ExecuteOutcome, ExecutionDiagnostics, PreviewData, QueryEngine,
    TIMEOUT_MARKER,
};
use crate::error::{GateError, Result};

/// Response header some engines use to return the correlation id.
const CORRELATION_HEADER: &str = "x-correlation-id";

/// Query engine reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    config: EngineConfig,
    dry_plan_url: Url,
    query_url: Url,
}

impl HttpEngine {
    /// Creates a new engine client with the given configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let dry_plan_url = config.endpoint(&config.dry_plan_path)?;
        let query_url = config.endpoint(&config.query_path)?;

        Ok(Self {
            config,
            dry_plan_url,
            query_url,
        })
    }
}

#[async_trait]
impl QueryEngine for HttpEngine {
    async fn open_session(&self) -> Result<Box<dyn EngineSession>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| GateError::engine(format!("Failed to create HTTP client: {}", e)))?;

        trace!("Opened engine session against {}", self.config.base_url);

        Ok(Box::new(HttpSession {
            client,
            dry_plan_url: self.dry_plan_url.clone(),
            query_url: self.query_url.clone(),
            timeout_secs: self.config.timeout_secs,
        }))
    }
}

/// One HTTP session, owned by a single classification call.
///
/// Holds its own connection pool; dropping the session closes it.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    dry_plan_url: Url,
    query_url: Url,
    timeout_secs: u64,
}

impl HttpSession {
    /// Maps a transport error to engine diagnostic text.
    fn describe_transport_error(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!(
                "{TIMEOUT_MARKER} after {} seconds: {error}",
                self.timeout_secs
            )
        } else if error.is_connect() {
            format!("Failed to connect to query engine: {error}")
        } else {
            format!("Request failed: {error}")
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &T,
    ) -> std::result::Result<Response, String> {
        self.client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.describe_transport_error(&e))
    }

    async fn read_body(&self, response: Response) -> std::result::Result<String, String> {
        response
            .text()
            .await
            .map_err(|e| self.describe_transport_error(&e))
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        trace!("Released engine session");
    }
}

#[async_trait]
impl EngineSession for HttpSession {
    async fn dry_plan(
        &self,
        sql: &str,
        data_source: &str,
        allow_fallback: bool,
    ) -> Result<DryPlanOutcome> {
        let request = DryPlanRequest {
            sql,
            data_source,
            allow_fallback,
        };

        debug!("Dry plan against {} ({})", self.dry_plan_url, data_source);

        let response = match self.post(&self.dry_plan_url, &request).await {
            Ok(response) => response,
            Err(message) => return Ok(DryPlanOutcome::failed(message)),
        };

        let status = response.status();
        let body = match self.read_body(response).await {
            Ok(body) => body,
            Err(message) => return Ok(DryPlanOutcome::failed(message)),
        };

        if status.is_success() {
            Ok(DryPlanOutcome::planned())
        } else {
            Ok(DryPlanOutcome::failed(error_message_from_body(status, &body)))
        }
    }

    async fn execute_sql(
        &self,
        sql: &str,
        project_id: Option<&str>,
        limit: u32,
        dry_run: bool,
    ) -> Result<ExecuteOutcome> {
        let request = QueryRequest {
            sql,
            project_id,
            limit,
            dry_run,
        };

        debug!(
            "Execute against {} (limit={}, dry_run={})",
            self.query_url, limit, dry_run
        );

        let response = match self.post(&self.query_url, &request).await {
            Ok(response) => response,
            Err(message) => {
                return Ok(ExecuteOutcome::failed(ExecutionDiagnostics {
                    error_message: message,
                    ..Default::default()
                }))
            }
        };

        let status = response.status();
        let header_correlation_id = response
            .headers()
            .get(CORRELATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = match self.read_body(response).await {
            Ok(body) => body,
            Err(message) => {
                return Ok(ExecuteOutcome::failed(ExecutionDiagnostics {
                    error_message: message,
                    correlation_id: header_correlation_id.unwrap_or_default(),
                    ..Default::default()
                }))
            }
        };

        Ok(parse_query_response(
            status,
            &body,
            header_correlation_id,
            dry_run,
        ))
    }
}

/// Builds an outcome from a query endpoint response.
///
/// Dry runs succeed on any 2xx. Preview executions succeed only when rows
/// came back; an empty result is a failure with no diagnostic text.
fn parse_query_response(
    status: StatusCode,
    body: &str,
    header_correlation_id: Option<String>,
    dry_run: bool,
) -> ExecuteOutcome {
    if !status.is_success() {
        let error: EngineErrorResponse = serde_json::from_str(body).unwrap_or_default();
        let error_message = error
            .message()
            .map(String::from)
            .unwrap_or_else(|| error_message_from_body(status, body));

        return ExecuteOutcome::failed(ExecutionDiagnostics {
            error_message,
            error_sql: error.sql,
            correlation_id: error
                .correlation_id
                .or(header_correlation_id)
                .unwrap_or_default(),
        });
    }

    let success: QuerySuccessResponse = if body.trim().is_empty() {
        QuerySuccessResponse::default()
    } else {
        match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return ExecuteOutcome::failed(ExecutionDiagnostics {
                    error_message: format!("Failed to parse engine response: {e}"),
                    correlation_id: header_correlation_id.unwrap_or_default(),
                    ..Default::default()
                })
            }
        }
    };

    let correlation_id = success
        .correlation_id
        .or(header_correlation_id)
        .unwrap_or_default();
    let data = PreviewData {
        columns: success.columns,
        data: success.data,
    };

    let has_data = !data.is_empty();
    ExecuteOutcome {
        success: dry_run || has_data,
        data: if dry_run { None } else { Some(data) },
        diagnostics: ExecutionDiagnostics {
            correlation_id,
            ..Default::default()
        },
    }
}

/// Extracts a diagnostic from an error body, falling back to the raw text.
fn error_message_from_body(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<EngineErrorResponse>(body);
    if let Ok(error) = &parsed {
        if let Some(message) = error.message() {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() || parsed.is_ok() {
        format!("Query engine error ({status})")
    } else {
        body.to_string()
    }
}

// Engine API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DryPlanRequest<'a> {
    sql: &'a str,
    data_source: &'a str,
    allow_fallback: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    sql: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    limit: u32,
    dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuerySuccessResponse {
    #[serde(default)]
    correlation_id: Option<String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    correlation_id: Option<String>,
}

impl EngineErrorResponse {
    /// First non-blank of `message` and `error`.
    fn message(&self) -> Option<&str> {
        non_blank(&self.message).or_else(|| non_blank(&self.error))
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|text| !text.trim().is_empty())
}
