//! Execution Tracker - concurrent home of every execution record
//!
//! Each record sits behind one `DashMap` shard lock: a transition holds the
//! write guard for its whole closure, so writers are serialized per record
//! and readers never observe a half-applied transition.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{ExecutionStatus, ScenarioExecution, StatusReport};
use crate::scenario::ScenarioConfig;
use crate::{Error, Result};

/// Result of registering a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A fresh record was created and must be dispatched.
    Created,
    /// An identical scenario is already tracked; reuse it.
    Existing,
}

/// Concurrent store of execution records keyed by scenario id.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    executions: DashMap<String, ScenarioExecution>,
}

impl ExecutionTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario.
    ///
    /// An existing record is reused unless it ended in `Error`, in which case
    /// it is replaced by a fresh `Initialized` record.
    pub fn register(&self, scenario_id: &str, config: &ScenarioConfig) -> Registration {
        match self.executions.entry(scenario_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().status() == ExecutionStatus::Error {
                    occupied.insert(ScenarioExecution::new(scenario_id, config.clone()));
                    Registration::Created
                } else {
                    Registration::Existing
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ScenarioExecution::new(scenario_id, config.clone()));
                Registration::Created
            }
        }
    }

    /// Apply a transition to a record and return the resulting snapshot.
    ///
    /// The closure runs on a copy that replaces the record only if it
    /// returns `Ok`, so a multi-step closure failing halfway changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or whatever the
    /// transition returns (typically [`Error::InvalidTransition`]).
    pub fn transition<F>(&self, scenario_id: &str, apply: F) -> Result<ScenarioExecution>
    where
        F: FnOnce(&mut ScenarioExecution) -> Result<()>,
    {
        let mut record = self
            .executions
            .get_mut(scenario_id)
            .ok_or_else(|| Error::NotFound(scenario_id.to_string()))?;
        let mut next = record.value().clone();
        apply(&mut next)?;
        *record.value_mut() = next.clone();
        Ok(next)
    }

    /// Snapshot of a record.
    #[must_use]
    pub fn snapshot(&self, scenario_id: &str) -> Option<ScenarioExecution> {
        self.executions.get(scenario_id).map(|r| r.value().clone())
    }

    /// Status report for a record.
    #[must_use]
    pub fn status(&self, scenario_id: &str) -> Option<StatusReport> {
        self.executions
            .get(scenario_id)
            .map(|r| r.value().status_report())
    }

    /// Ids of every tracked execution, sorted.
    #[must_use]
    pub fn scenario_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.executions.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of tracked executions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    /// Whether no execution is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{EnvironmentType, ModelKind};
    use std::sync::Arc;

    fn config() -> ScenarioConfig {
        ScenarioConfig::new(EnvironmentType::Town, 10_000).model(ModelKind::Economic)
    }

    #[test]
    fn test_register_dedups_live_records() {
        let tracker = ExecutionTracker::new();
        assert_eq!(tracker.register("a", &config()), Registration::Created);
        assert_eq!(tracker.register("a", &config()), Registration::Existing);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_register_replaces_failed_record() {
        let tracker = ExecutionTracker::new();
        tracker.register("a", &config());
        tracker
            .transition("a", |e| {
                e.start()?;
                e.fail("boom")
            })
            .unwrap();
        assert_eq!(tracker.register("a", &config()), Registration::Created);
        assert_eq!(
            tracker.status("a").unwrap().status,
            ExecutionStatus::Initialized
        );
    }

    #[test]
    fn test_transition_unknown_id() {
        let tracker = ExecutionTracker::new();
        assert!(matches!(
            tracker.transition("missing", ScenarioExecution::start),
            Err(Error::NotFound(_))
        ));
        assert!(tracker.snapshot("missing").is_none());
    }

    #[test]
    fn test_failed_transition_leaves_record_untouched() {
        let tracker = ExecutionTracker::new();
        tracker.register("a", &config());
        let before = tracker.snapshot("a").unwrap();
        assert!(tracker.transition("a", ScenarioExecution::begin_aggregation).is_err());
        assert_eq!(tracker.snapshot("a").unwrap(), before);
    }

    #[test]
    fn test_multi_step_transition_is_all_or_nothing() {
        let tracker = ExecutionTracker::new();
        tracker.register("a", &config());
        let before = tracker.snapshot("a").unwrap();
        let result = tracker.transition("a", |e| {
            e.start()?;
            e.record_progress(10, "dispatched")?;
            // Already running: rejected.
            e.start()
        });
        assert!(result.is_err());
        assert_eq!(tracker.snapshot("a").unwrap(), before);
        assert_eq!(
            tracker.status("a").unwrap().status,
            ExecutionStatus::Initialized
        );
    }

    #[test]
    fn test_concurrent_readers_see_monotonic_progress() {
        let tracker = Arc::new(ExecutionTracker::new());
        tracker.register("a", &config());
        tracker.transition("a", ScenarioExecution::start).unwrap();

        let writer = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for p in 10..=80u8 {
                    tracker
                        .transition("a", |e| e.record_progress(p, format!("step {p}")))
                        .unwrap();
                }
            })
        };
        let reader = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                let mut last = 0;
                for _ in 0..500 {
                    let progress = tracker.status("a").unwrap().progress;
                    assert!(progress >= last);
                    last = progress;
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(tracker.status("a").unwrap().progress, 80);
    }
}
