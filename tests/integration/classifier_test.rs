//! Classifier behaviour through the public API, backed by the mock engine.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use sqlgate::engine::{DryPlanOutcome, ExecuteOutcome, ExecutionDiagnostics, MockEngine};
use sqlgate::generation::{ClassifyRequest, GenerationOutcome, ResultClassifier, ValidationStrategy};

fn classifier(engine: &MockEngine) -> ResultClassifier {
    ResultClassifier::new(Arc::new(engine.clone()))
}

#[tokio::test]
async fn test_dry_plan_scenario_result_shape() {
    let engine = MockEngine::new().with_dry_plan(DryPlanOutcome::planned());
    let request = ClassifyRequest::new(ValidationStrategy::dry_plan(true));

    let outcome = classifier(&engine).run(&["SELECT 1"], &request).await;

    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "valid_generation_result": {"sql": "SELECT 1", "correlation_id": ""},
            "invalid_generation_result": {}
        })
    );
}

#[tokio::test]
async fn test_dry_run_failure_result_shape() {
    let engine = MockEngine::new().with_execute(ExecuteOutcome::failed(ExecutionDiagnostics {
        error_message: "boom".to_string(),
        error_sql: Some("SELECT 1".to_string()),
        correlation_id: "cid-123".to_string(),
    }));

    let outcome = classifier(&engine)
        .run(&["  SELECT * FROM books LIMIT 5;  "], &ClassifyRequest::default())
        .await;

    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "valid_generation_result": {},
            "invalid_generation_result": {
                "sql": "SELECT 1",
                "original_sql": "SELECT * FROM books LIMIT 5;",
                "type": "DRY_RUN",
                "error": "boom",
                "correlation_id": "cid-123"
            }
        })
    );
}

#[tokio::test]
async fn test_exactly_one_side_populated() {
    let engines = [
        MockEngine::new(),
        MockEngine::new().with_execute(ExecuteOutcome::failed(ExecutionDiagnostics::default())),
    ];

    for engine in engines {
        for strategy in [
            ValidationStrategy::dry_plan(true),
            ValidationStrategy::dry_run(),
            ValidationStrategy::preview(),
        ] {
            let outcome = classifier(&engine)
                .run(&["SELECT 1"], &ClassifyRequest::new(strategy))
                .await;
            assert!(outcome.valid().is_some() ^ outcome.invalid().is_some());
        }
    }
}

#[tokio::test]
async fn test_internal_failure_empties_both_sides() {
    let engine = MockEngine::new().with_session_error("engine unavailable");

    let outcome = classifier(&engine)
        .run(&["SELECT 1"], &ClassifyRequest::default())
        .await;

    assert_eq!(outcome, GenerationOutcome::Empty);
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({"valid_generation_result": {}, "invalid_generation_result": {}})
    );
}

#[tokio::test]
async fn test_correction_round_trip() {
    // A correction pipeline feeds a new candidate back after an invalid result.
    let failing = MockEngine::new().with_execute(ExecuteOutcome::failed(ExecutionDiagnostics {
        error_message: "column \"nme\" does not exist".to_string(),
        ..Default::default()
    }));
    let passing = MockEngine::new().with_execute(ExecuteOutcome::succeeded("cid-fixed"));
    let request = ClassifyRequest::default();

    let first = classifier(&failing)
        .run(&["SELECT nme FROM users"], &request)
        .await;
    let invalid = first.invalid().unwrap();
    assert_eq!(invalid.original_sql.as_deref(), Some("SELECT nme FROM users"));

    let corrected = classifier(&passing)
        .run(&[r#"{"sql": "SELECT name FROM users"}"#], &request)
        .await;
    assert_eq!(corrected.valid().unwrap().sql, "SELECT name FROM users");
    assert_eq!(failing.calls().len(), 1);
    assert_eq!(passing.calls().len(), 1);
}
