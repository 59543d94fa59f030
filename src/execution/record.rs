//! Scenario Execution - lifecycle record of one scenario run

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::CompositeResult;
use crate::scenario::ScenarioConfig;
use crate::{Error, Result};

/// Progress reported once models are dispatched.
pub const DISPATCH_PROGRESS: u8 = 10;
/// Progress span covered while models run.
pub const MODEL_PROGRESS_SPAN: u8 = 70;
/// Progress reported when aggregation starts.
pub const AGGREGATION_PROGRESS: u8 = 80;

/// Status of a scenario execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Created, not yet dispatched.
    Initialized,
    /// Models are running.
    Running,
    /// All models reported; composite being computed.
    Aggregating,
    /// Terminal: composite result available.
    Completed,
    /// Terminal: execution failed.
    Error,
}

impl ExecutionStatus {
    /// Whether the status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initialized, Self::Running | Self::Error)
                | (Self::Running, Self::Running | Self::Aggregating | Self::Error)
                | (Self::Aggregating, Self::Completed | Self::Error)
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initialized => "INITIALIZED",
            Self::Running => "RUNNING",
            Self::Aggregating => "AGGREGATING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        })
    }
}

/// Point-in-time view of an execution returned to status pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Scenario id
    pub scenario_id: String,
    /// Current status
    pub status: ExecutionStatus,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Current phase label
    pub phase: String,
    /// Human-readable failure reason (ERROR only)
    pub reason: Option<String>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Scenario Execution tracks one scenario from dispatch to a terminal state.
///
/// Progress never decreases. Once `Completed` or `Error` is reached every
/// further mutation fails with [`Error::InvalidTransition`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioExecution {
    scenario_id: String,
    config: ScenarioConfig,
    status: ExecutionStatus,
    progress: u8,
    phase: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<CompositeResult>,
    reason: Option<String>,
}

impl ScenarioExecution {
    /// Create a new execution record in `Initialized` status.
    #[must_use]
    pub fn new(scenario_id: impl Into<String>, config: ScenarioConfig) -> Self {
        let now = Utc::now();
        Self {
            scenario_id: scenario_id.into(),
            config,
            status: ExecutionStatus::Initialized,
            progress: 0,
            phase: "initialization".to_string(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            result: None,
            reason: None,
        }
    }

    /// Get the scenario id.
    #[must_use]
    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    /// Get the scenario configuration.
    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Get the progress percentage.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Get the current phase label.
    #[must_use]
    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Get the completion timestamp, if terminal.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Get the composite result, if completed.
    #[must_use]
    pub const fn result(&self) -> Option<&CompositeResult> {
        self.result.as_ref()
    }

    /// Get the failure reason, if in error.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Build a status report snapshot.
    #[must_use]
    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            scenario_id: self.scenario_id.clone(),
            status: self.status,
            progress: self.progress,
            phase: self.phase.clone(),
            reason: self.reason.clone(),
            updated_at: self.updated_at,
        }
    }

    fn ensure(&self, next: ExecutionStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                scenario_id: self.scenario_id.clone(),
                from: self.status,
                to: next,
            })
        }
    }

    fn touch(&mut self, status: ExecutionStatus, progress: u8, phase: impl Into<String>) {
        self.status = status;
        self.progress = self.progress.max(progress.min(100));
        self.phase = phase.into();
        self.updated_at = Utc::now();
    }

    /// Dispatch: `Initialized -> Running`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] from any other status.
    pub fn start(&mut self) -> Result<()> {
        if self.status != ExecutionStatus::Initialized {
            return Err(Error::InvalidTransition {
                scenario_id: self.scenario_id.clone(),
                from: self.status,
                to: ExecutionStatus::Running,
            });
        }
        self.touch(ExecutionStatus::Running, DISPATCH_PROGRESS, "dispatching models");
        Ok(())
    }

    /// Record model progress while `Running`. A lower value than the current
    /// progress leaves progress unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless `Running`.
    pub fn record_progress(&mut self, progress: u8, phase: impl Into<String>) -> Result<()> {
        if self.status != ExecutionStatus::Running {
            return Err(Error::InvalidTransition {
                scenario_id: self.scenario_id.clone(),
                from: self.status,
                to: ExecutionStatus::Running,
            });
        }
        self.touch(ExecutionStatus::Running, progress, phase);
        Ok(())
    }

    /// All models reported: `Running -> Aggregating`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless `Running`.
    pub fn begin_aggregation(&mut self) -> Result<()> {
        if self.status != ExecutionStatus::Running {
            return Err(Error::InvalidTransition {
                scenario_id: self.scenario_id.clone(),
                from: self.status,
                to: ExecutionStatus::Aggregating,
            });
        }
        self.touch(
            ExecutionStatus::Aggregating,
            AGGREGATION_PROGRESS,
            "aggregating model results",
        );
        Ok(())
    }

    /// Attach the composite: `Aggregating -> Completed`, progress 100.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless `Aggregating`.
    pub fn complete(&mut self, result: CompositeResult) -> Result<()> {
        self.ensure(ExecutionStatus::Completed)?;
        self.touch(ExecutionStatus::Completed, 100, "completed");
        self.completed_at = Some(self.updated_at);
        self.result = Some(result);
        Ok(())
    }

    /// Terminate with a reason. Progress holds at its last value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if already terminal.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure(ExecutionStatus::Error)?;
        let reason = reason.into();
        let progress = self.progress;
        self.touch(ExecutionStatus::Error, progress, format!("error: {reason}"));
        self.completed_at = Some(self.updated_at);
        self.reason = Some(reason);
        Ok(())
    }
}
