//! Execution tracking
//!
//! ## Lifecycle
//!
//! ```text
//! INITIALIZED ──> RUNNING ──> AGGREGATING ──> COMPLETED
//!      │             │              │
//!      └─────────────┴──────────────┴──────> ERROR
//! ```
//!
//! Records live in an [`ExecutionTracker`]; all mutation goes through
//! [`ExecutionTracker::transition`], and readers receive cloned snapshots.

mod record;
mod tracker;

pub use record::{
    ExecutionStatus, ScenarioExecution, StatusReport, AGGREGATION_PROGRESS, DISPATCH_PROGRESS,
    MODEL_PROGRESS_SPAN,
};
pub use tracker::{ExecutionTracker, Registration};
