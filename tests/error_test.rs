//! Tests for error types

use scenario_engine::{Error, ExecutionStatus, ModelKind};

#[test]
fn test_validation_error() {
    let error = Error::Validation("population 50000000 outside Rural Village range".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid scenario configuration"));
    assert!(error_str.contains("Rural Village"));
}

#[test]
fn test_model_not_found_error() {
    let error = Error::ModelNotFound(ModelKind::Infrastructure);
    let error_str = format!("{error}");
    assert!(error_str.contains("Model not registered: infrastructure"));
    assert!(error_str.contains("Register it at startup"));
}

#[test]
fn test_model_execution_error() {
    let error = Error::ModelExecution {
        model: ModelKind::Economic,
        reason: "negative GDP".to_string(),
    };
    assert_eq!(format!("{error}"), "Model economic failed: negative GDP");
}

#[test]
fn test_timeout_error() {
    let error = Error::Timeout {
        context: "scenario scn-1 produced no model result".to_string(),
        elapsed_ms: 300_000,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Timed out after 300000 ms"));
    assert!(error_str.contains("scn-1"));
}

#[test]
fn test_aggregation_error() {
    let error = Error::Aggregation("no model succeeded".to_string());
    assert!(format!("{error}").contains("Aggregation failed: no model succeeded"));
}

#[test]
fn test_storage_unavailable_error() {
    let error = Error::StorageUnavailable("connection refused".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage unavailable"));
    assert!(error_str.contains("retried on the next save"));
}

#[test]
fn test_invalid_transition_error() {
    let error = Error::InvalidTransition {
        scenario_id: "scn-7".to_string(),
        from: ExecutionStatus::Completed,
        to: ExecutionStatus::Error,
    };
    assert_eq!(
        format!("{error}"),
        "Invalid transition for scenario scn-7: COMPLETED -> ERROR"
    );
}

#[test]
fn test_not_found_error() {
    let error = Error::NotFound("scn-missing".to_string());
    assert!(format!("{error}").contains("Scenario not found: scn-missing"));
}

#[test]
fn test_execution_failed_error() {
    let error = Error::ExecutionFailed {
        scenario_id: "scn-2".to_string(),
        reason: "Aggregation failed".to_string(),
    };
    assert_eq!(format!("{error}"), "Scenario scn-2 failed: Aggregation failed");
}

#[test]
fn test_serialization_error_from() {
    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let error: Error = json_err.into();
    assert!(format!("{error}").contains("Serialization error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error".to_string());
    assert_eq!(format!("{error}"), "custom error");
}

#[test]
fn test_error_debug() {
    let error = Error::NotFound("scn-1".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("NotFound"));
}
