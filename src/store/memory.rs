//! In-process store using `DashMap`.
//!
//! Data is lost on process restart. The availability switch lets tests
//! simulate an unreachable backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::{LogLevel, ScenarioStore};
use crate::execution::ScenarioExecution;
use crate::scenario::{default_countries, CountryRecord};
use crate::{Error, Result};

/// One appended log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity
    pub level: LogLevel,
    /// Message text
    pub message: String,
    /// Scenario the line refers to, if any
    pub scenario_id: Option<String>,
    /// Append timestamp
    pub timestamp: DateTime<Utc>,
}

/// In-memory persistence gateway.
///
/// ```rust
/// use scenario_engine::store::{MemoryStore, ScenarioStore};
///
/// # async fn example() -> scenario_engine::Result<()> {
/// let store = MemoryStore::new();
/// let countries = store.load_country_data().await?;
/// assert!(!countries.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    executions: DashMap<String, ScenarioExecution>,
    logs: Mutex<Vec<LogEntry>>,
    countries: Vec<CountryRecord>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store serving the built-in country set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_countries(default_countries())
    }

    /// Create an empty store serving a custom country set.
    #[must_use]
    pub fn with_countries(countries: Vec<CountryRecord>) -> Self {
        Self {
            executions: DashMap::new(),
            logs: Mutex::new(Vec::new()),
            countries,
            available: AtomicBool::new(true),
        }
    }

    /// Make every operation succeed (`true`) or fail with
    /// `StorageUnavailable` (`false`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Whether the store currently accepts operations.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Stored snapshot of an execution.
    #[must_use]
    pub fn execution(&self, scenario_id: &str) -> Option<ScenarioExecution> {
        self.executions.get(scenario_id).map(|e| e.value().clone())
    }

    /// Every appended log line, oldest first.
    #[must_use]
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Log lines tied to one scenario.
    #[must_use]
    pub fn logs_for(&self, scenario_id: &str) -> Vec<LogEntry> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.scenario_id.as_deref() == Some(scenario_id))
            .collect()
    }

    /// Number of stored executions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    /// Whether no execution is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    fn ensure_available(&self, operation: &str) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::StorageUnavailable(format!(
                "memory store offline during {operation}"
            )))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioStore for MemoryStore {
    async fn save_execution(&self, execution: &ScenarioExecution) -> Result<()> {
        self.ensure_available("save_execution")?;
        // A late save of an older snapshot never replaces a newer one.
        self.executions
            .entry(execution.scenario_id().to_string())
            .and_modify(|stored| {
                if stored.updated_at() <= execution.updated_at() {
                    *stored = execution.clone();
                }
            })
            .or_insert_with(|| execution.clone());
        Ok(())
    }

    async fn load_country_data(&self) -> Result<Vec<CountryRecord>> {
        self.ensure_available("load_country_data")?;
        Ok(self.countries.clone())
    }

    async fn append_log(
        &self,
        level: LogLevel,
        message: &str,
        scenario_id: Option<&str>,
    ) -> Result<()> {
        self.ensure_available("append_log")?;
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                message: message.to_string(),
                scenario_id: scenario_id.map(str::to_string),
                timestamp: Utc::now(),
            });
        Ok(())
    }
}
