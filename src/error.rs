//! Error types for the scenario engine
//!
//! Per-model failures are contained by the scheduler and never surface here
//! as execution-ending errors unless every model failed.

use thiserror::Error;

use crate::execution::ExecutionStatus;
use crate::scenario::ModelKind;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Scenario engine error types
#[derive(Error, Debug)]
pub enum Error {
    /// Scenario configuration rejected before scheduling
    #[error("Invalid scenario configuration: {0}")]
    Validation(String),

    /// Model identifier has no registry entry
    #[error("Model not registered: {0}\nRegister it at startup before submitting scenarios")]
    ModelNotFound(ModelKind),

    /// One model failed internally (recorded as a failed outcome)
    #[error("Model {model} failed: {reason}")]
    ModelExecution {
        /// Model that failed
        model: ModelKind,
        /// Failure detail reported by the model
        reason: String,
    },

    /// A model or a whole execution exceeded its allotted time
    #[error("Timed out after {elapsed_ms} ms: {context}")]
    Timeout {
        /// What timed out
        context: String,
        /// Elapsed wall-clock time in milliseconds
        elapsed_ms: u128,
    },

    /// Aggregation impossible (no model produced a usable result)
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    /// Persistence gateway could not be reached
    #[error("Storage unavailable: {0}\nResults are held in memory and retried on the next save")]
    StorageUnavailable(String),

    /// Attempt to mutate an execution in a state that forbids it
    #[error("Invalid transition for scenario {scenario_id}: {from} -> {to}")]
    InvalidTransition {
        /// Scenario whose record was targeted
        scenario_id: String,
        /// Current status
        from: ExecutionStatus,
        /// Requested status
        to: ExecutionStatus,
    },

    /// Unknown scenario id
    #[error("Scenario not found: {0}")]
    NotFound(String),

    /// Execution ended in the ERROR state
    #[error("Scenario {scenario_id} failed: {reason}")]
    ExecutionFailed {
        /// Failed scenario
        scenario_id: String,
        /// Reason recorded on the execution
        reason: String,
    },

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
