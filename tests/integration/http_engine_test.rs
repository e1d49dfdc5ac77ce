//! HTTP engine integration tests.
//!
//! Runs the real HTTP client against a local stub engine.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use sqlgate::config::EngineConfig;
use sqlgate::engine::{HttpEngine, QueryEngine};
use sqlgate::generation::{
    ClassifyRequest, FailureKind, GenerationOutcome, InvalidGenerationResult, ResultClassifier,
    ValidGenerationResult, ValidationStrategy,
};

use super::stub::{StubEngine, StubResponse};

fn classifier_for(stub: &StubEngine, timeout_secs: u64) -> ResultClassifier {
    let config = EngineConfig::new(stub.base_url.clone()).with_timeout(timeout_secs);
    ResultClassifier::new(Arc::new(HttpEngine::new(config).unwrap()))
}

#[tokio::test]
async fn test_dry_run_success_over_http() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(200, json!({"correlationId": "cid-http"})),
    )])
    .await;

    let outcome = classifier_for(&stub, 5)
        .run(
            &["```sql\nSELECT * FROM books\n```"],
            &ClassifyRequest::default().with_project_id("12"),
        )
        .await;

    assert_eq!(
        outcome,
        GenerationOutcome::Valid(ValidGenerationResult {
            sql: "SELECT * FROM books".to_string(),
            correlation_id: "cid-http".to_string(),
        })
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        json!({"sql": "SELECT * FROM books", "projectId": "12", "limit": 1, "dryRun": true})
    );
}

#[tokio::test]
async fn test_dry_run_failure_over_http() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(
            400,
            json!({
                "message": "column \"titel\" does not exist",
                "sql": "SELECT titel FROM books",
                "correlationId": "cid-err"
            }),
        ),
    )])
    .await;

    let outcome = classifier_for(&stub, 5)
        .run(&["SELECT titel FROM books;"], &ClassifyRequest::default())
        .await;

    assert_eq!(
        outcome,
        GenerationOutcome::Invalid(InvalidGenerationResult {
            sql: "SELECT titel FROM books".to_string(),
            original_sql: Some("SELECT titel FROM books;".to_string()),
            kind: FailureKind::DryRun,
            error: "column \"titel\" does not exist".to_string(),
            correlation_id: "cid-err".to_string(),
        })
    );
}

#[tokio::test]
async fn test_correlation_id_from_header() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::text(200, "").with_header("X-Correlation-Id", "cid-header"),
    )])
    .await;

    let outcome = classifier_for(&stub, 5)
        .run(&["SELECT 1"], &ClassifyRequest::default())
        .await;

    assert_eq!(outcome.valid().unwrap().correlation_id, "cid-header");
}

#[tokio::test]
async fn test_dry_plan_over_http() {
    let stub = StubEngine::start(vec![(
        "/v1/mdl/dry-plan",
        StubResponse::json(422, json!({"message": "Table 'books' not found"})),
    )])
    .await;
    let request =
        ClassifyRequest::new(ValidationStrategy::dry_plan(false)).with_data_source("postgres");

    let outcome = classifier_for(&stub, 5)
        .run(&["SELECT * FROM books"], &request)
        .await;

    let invalid = outcome.invalid().unwrap();
    assert_eq!(invalid.kind, FailureKind::DryPlan);
    assert_eq!(invalid.error, "Table 'books' not found");
    assert_eq!(invalid.original_sql, None);
    assert_eq!(invalid.correlation_id, "");

    let requests = stub.requests();
    assert_eq!(requests[0].path, "/v1/mdl/dry-plan");
    assert_eq!(
        requests[0].body,
        json!({"sql": "SELECT * FROM books", "dataSource": "postgres", "allowFallback": false})
    );
}

#[tokio::test]
async fn test_preview_empty_and_with_rows() {
    let empty = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(200, json!({"correlationId": "c1", "columns": ["id"], "data": []})),
    )])
    .await;
    let rows = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(
            200,
            json!({"correlationId": "c2", "columns": ["id"], "data": [[7]]}),
        ),
    )])
    .await;
    let request = ClassifyRequest::new(ValidationStrategy::preview());

    let outcome = classifier_for(&empty, 5).run(&["SELECT id FROM t"], &request).await;
    assert_eq!(outcome.invalid().unwrap().kind, FailureKind::PreviewEmptyData);
    assert_eq!(empty.requests()[0].body["dryRun"], json!(false));

    let outcome = classifier_for(&rows, 5).run(&["SELECT id FROM t"], &request).await;
    assert_eq!(outcome.valid().unwrap().correlation_id, "c2");
}

#[tokio::test]
async fn test_preview_engine_error_is_preview_failed() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::text(500, "division by zero"),
    )])
    .await;

    let outcome = classifier_for(&stub, 5)
        .run(&["SELECT 1/0"], &ClassifyRequest::new(ValidationStrategy::preview()))
        .await;

    let invalid = outcome.invalid().unwrap();
    assert_eq!(invalid.kind, FailureKind::PreviewFailed);
    assert_eq!(invalid.error, "division by zero");
}

#[tokio::test]
async fn test_preview_error_with_blank_message_is_preview_failed() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(400, json!({"message": "", "correlationId": "cid-blank"})),
    )])
    .await;

    let outcome = classifier_for(&stub, 5)
        .run(&["SELECT 1"], &ClassifyRequest::new(ValidationStrategy::preview()))
        .await;

    let invalid = outcome.invalid().unwrap();
    assert_eq!(invalid.kind, FailureKind::PreviewFailed);
    assert_eq!(invalid.error, "Query engine error (400 Bad Request)");
    assert_eq!(invalid.correlation_id, "cid-blank");
}

#[tokio::test]
async fn test_transport_timeout_is_time_out() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(200, json!({})).with_delay(Duration::from_secs(3)),
    )])
    .await;

    let outcome = classifier_for(&stub, 1)
        .run(&["SELECT pg_sleep(10)"], &ClassifyRequest::default())
        .await;

    let invalid = outcome.invalid().unwrap();
    assert_eq!(invalid.kind, FailureKind::TimeOut);
    assert!(invalid.error.starts_with("Request timed out"));
}

#[tokio::test]
async fn test_unreachable_engine_is_classified_failure() {
    // Bind then drop a listener to get a port nothing listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let engine = HttpEngine::new(EngineConfig::new(format!("http://{addr}"))).unwrap();
    let session = engine.open_session().await.unwrap();

    let outcome = session.execute_sql("SELECT 1", None, 1, true).await.unwrap();

    assert!(!outcome.success);
    assert!(!outcome.diagnostics.error_message.is_empty());
}

#[tokio::test]
async fn test_concurrent_classifications_are_independent() {
    let stub = StubEngine::start(vec![(
        "/v1/query",
        StubResponse::json(200, json!({"correlationId": "shared"})),
    )])
    .await;
    let classifier = classifier_for(&stub, 5);
    let request = ClassifyRequest::default();

    let candidates: Vec<String> = (0..8).map(|i| format!("SELECT {i}")).collect();
    let outcomes = futures::future::join_all(
        candidates
            .iter()
            .map(|sql| classifier.run(std::slice::from_ref(sql), &request)),
    )
    .await;

    for (candidate, outcome) in candidates.iter().zip(outcomes) {
        assert_eq!(&outcome.valid().unwrap().sql, candidate);
    }
    assert_eq!(stub.requests().len(), 8);
}
