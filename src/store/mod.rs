//! Persistence gateway
//!
//! The engine writes execution snapshots and log lines through
//! [`ScenarioStore`] and reads the country reference set from it. Any
//! failure is reported as [`Error::StorageUnavailable`](crate::Error) and
//! never ends an execution.
//!
//! # Example
//!
//! ```rust
//! use scenario_engine::store::{LogLevel, MemoryStore, ScenarioStore};
//!
//! # async fn example() -> scenario_engine::Result<()> {
//! let store = MemoryStore::new();
//! store.append_log(LogLevel::Info, "engine started", None).await?;
//! assert_eq!(store.logs().len(), 1);
//!
//! store.set_available(false);
//! assert!(store.load_country_data().await.is_err());
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::{LogEntry, MemoryStore};

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::execution::ScenarioExecution;
use crate::scenario::CountryRecord;
use crate::Result;

/// Severity of a gateway log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail
    Debug,
    /// Lifecycle event
    Info,
    /// Degraded but continuing
    Warning,
    /// Execution-level failure
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

/// Outbound persistence and reporting boundary.
pub trait ScenarioStore: Send + Sync {
    /// Persist the latest snapshot of an execution, replacing any earlier one.
    fn save_execution(
        &self,
        execution: &ScenarioExecution,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Load the country reference set.
    fn load_country_data(&self) -> impl Future<Output = Result<Vec<CountryRecord>>> + Send;

    /// Append a log line, optionally tied to a scenario.
    fn append_log(
        &self,
        level: LogLevel,
        message: &str,
        scenario_id: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;
}
