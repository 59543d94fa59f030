//! Model Result - one model invocation within one execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ModelReport;
use crate::scenario::ModelKind;
use crate::Error;

/// Outcome of a model invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOutcome {
    /// Model produced a usable result.
    Success,
    /// Model reported an internal error.
    Failed,
    /// Model did not finish before its deadline.
    TimedOut,
}

/// Model Result records one model invocation.
///
/// Created once by the scheduler and never mutated afterwards. Only
/// `Success` results carry a payload and participate in aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelResult {
    model: ModelKind,
    outcome: ModelOutcome,
    payload: serde_json::Value,
    confidence: f64,
    severity: f64,
    duration_ms: u64,
    memory_mb: f64,
    error: Option<String>,
}

impl ModelResult {
    /// Successful invocation.
    #[must_use]
    pub fn success(model: ModelKind, report: ModelReport, duration: Duration) -> Self {
        Self {
            model,
            outcome: ModelOutcome::Success,
            payload: report.payload,
            confidence: report.confidence.clamp(0.0, 1.0),
            severity: report.severity.clamp(0.0, 1.0),
            duration_ms: millis(duration),
            memory_mb: report.memory_mb,
            error: None,
        }
    }

    /// Failed invocation.
    #[must_use]
    pub fn failed(model: ModelKind, error: impl Into<String>, duration: Duration) -> Self {
        Self::unsuccessful(model, ModelOutcome::Failed, error.into(), duration)
    }

    /// Invocation that missed its deadline.
    #[must_use]
    pub fn timed_out(model: ModelKind, duration: Duration) -> Self {
        Self::unsuccessful(
            model,
            ModelOutcome::TimedOut,
            format!("no result after {} ms", millis(duration)),
            duration,
        )
    }

    fn unsuccessful(model: ModelKind, outcome: ModelOutcome, error: String, duration: Duration) -> Self {
        Self {
            model,
            outcome,
            payload: serde_json::Value::Null,
            confidence: 0.0,
            severity: 0.0,
            duration_ms: millis(duration),
            memory_mb: 0.0,
            error: Some(error),
        }
    }

    /// Get the model identifier.
    #[must_use]
    pub const fn model(&self) -> ModelKind {
        self.model
    }

    /// Get the outcome.
    #[must_use]
    pub const fn outcome(&self) -> ModelOutcome {
        self.outcome
    }

    /// Whether the invocation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == ModelOutcome::Success
    }

    /// Get the payload (`Null` unless successful).
    #[must_use]
    pub const fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Read a numeric payload field.
    #[must_use]
    pub fn metric(&self, field: &str) -> Option<f64> {
        self.payload.get(field).and_then(serde_json::Value::as_f64)
    }

    /// Get the confidence score.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Get the model's own severity indicator.
    #[must_use]
    pub const fn severity(&self) -> f64 {
        self.severity
    }

    /// Get the execution duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Get the estimated memory usage in megabytes.
    #[must_use]
    pub const fn memory_mb(&self) -> f64 {
        self.memory_mb
    }

    /// Get the error detail, if not successful.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The crate error describing an unsuccessful outcome.
    #[must_use]
    pub fn failure(&self) -> Option<Error> {
        let detail = self.error.clone().unwrap_or_default();
        match self.outcome {
            ModelOutcome::Success => None,
            ModelOutcome::Failed => Some(Error::ModelExecution {
                model: self.model,
                reason: detail,
            }),
            ModelOutcome::TimedOut => Some(Error::Timeout {
                context: format!("model {} produced {detail}", self.model),
                elapsed_ms: u128::from(self.duration_ms),
            }),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
