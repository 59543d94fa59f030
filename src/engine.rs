//! Scenario engine
//!
//! Owns every piece of process-wide state behind one `Arc`: registry,
//! execution tracker, scheduler, aggregator, result cache and persistence
//! gateway. Each submitted scenario is driven by its own tokio task:
//!
//! ```text
//! submit ─> validate ─> register ─> spawn drive
//!                                     │
//!   start (10%) ─> scheduler.run ─> progress 10 + 70·done/n
//!                                     │
//!   begin_aggregation (80%) ─> aggregate ─> cache artifacts ─> complete (100%)
//!                                     └──────> fail (progress held)
//! ```
//!
//! Storage failures never end an execution: the snapshot is parked in a
//! pending table and retried on the next save.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::{Aggregator, CompositeResult};
use crate::cache::{ArtifactKind, ResultCache};
use crate::config::EngineConfig;
use crate::execution::{
    ExecutionStatus, ExecutionTracker, Registration, ScenarioExecution, StatusReport,
    DISPATCH_PROGRESS, MODEL_PROGRESS_SPAN,
};
use crate::models::ModelOutcome;
use crate::registry::ModelRegistry;
use crate::scenario::{default_countries, CountryRecord, ModelKind, ScenarioConfig};
use crate::scheduler::{ModelJob, ModelProgress, Scheduler};
use crate::store::{LogLevel, MemoryStore, ScenarioStore};
use crate::{Error, Result};

/// Answer to a result query.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultLookup {
    /// Execution completed
    Ready(Arc<CompositeResult>),
    /// Execution still in progress
    Pending(StatusReport),
    /// Execution ended in ERROR
    Failed {
        /// Recorded reason
        reason: String,
    },
    /// Unknown scenario id
    NotFound,
}

/// Scenario orchestration engine.
pub struct Engine<S = MemoryStore> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("executions", &self.inner.tracker.len())
            .field("pending_saves", &self.inner.pending_saves.len())
            .finish_non_exhaustive()
    }
}

struct Inner<S> {
    config: EngineConfig,
    registry: Arc<ModelRegistry>,
    tracker: ExecutionTracker,
    scheduler: Scheduler,
    aggregator: Aggregator,
    cache: ResultCache,
    store: Arc<S>,
    countries: Arc<Vec<CountryRecord>>,
    pending_saves: DashMap<String, ScenarioExecution>,
    watchers: DashMap<String, Arc<watch::Sender<ExecutionStatus>>>,
}

/// One dispatch of a scenario. A re-run after ERROR gets a fresh status
/// channel, so a finishing driver only ever signals its own waiters.
struct Run {
    id: String,
    status: Arc<watch::Sender<ExecutionStatus>>,
}

impl Engine<MemoryStore> {
    /// Engine with the default configuration, the built-in models and an
    /// in-memory store.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::start`].
    pub async fn in_memory() -> Result<Self> {
        Self::start(
            EngineConfig::default(),
            ModelRegistry::with_default_models(),
            MemoryStore::new(),
        )
        .await
    }
}

impl<S: ScenarioStore + 'static> Engine<S> {
    /// Start an engine.
    ///
    /// Country reference data is loaded from the store once; if the store is
    /// unavailable the built-in set is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an invalid configuration.
    pub async fn start(config: EngineConfig, registry: ModelRegistry, store: S) -> Result<Self> {
        config.validate()?;
        let countries = match store.load_country_data().await {
            Ok(countries) => countries,
            Err(error) => {
                warn!(%error, "country data unavailable, using built-in reference set");
                default_countries()
            }
        };
        let scheduler = Scheduler::new(
            config.max_concurrent_models,
            config.execution_timeout(),
            config.model_timeout(),
        );
        info!(
            models = registry.len(),
            countries = countries.len(),
            max_concurrent_models = config.max_concurrent_models,
            execution_timeout_ms = config.execution_timeout_ms,
            "engine started"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                registry: Arc::new(registry),
                tracker: ExecutionTracker::new(),
                scheduler,
                aggregator: Aggregator::new(),
                cache: ResultCache::new(),
                store: Arc::new(store),
                countries: Arc::new(countries),
                pending_saves: DashMap::new(),
                watchers: DashMap::new(),
            }),
        })
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Model registry.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.inner.registry
    }

    /// Persistence gateway.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Result cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.inner.cache
    }

    /// Country reference set in use.
    #[must_use]
    pub fn countries(&self) -> &[CountryRecord] {
        &self.inner.countries
    }

    /// Ids of every tracked execution, sorted.
    #[must_use]
    pub fn scenario_ids(&self) -> Vec<String> {
        self.inner.tracker.scenario_ids()
    }

    /// Snapshots waiting for a successful save.
    #[must_use]
    pub fn pending_saves(&self) -> usize {
        self.inner.pending_saves.len()
    }

    /// Validate a scenario and start executing it.
    ///
    /// Identical configurations share one id. Resubmitting returns the
    /// existing execution unless it ended in ERROR, in which case it is run
    /// again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] or [`Error::ModelNotFound`] before any
    /// model runs.
    #[instrument(skip_all, fields(environment = %config.environment, population = config.population))]
    pub async fn submit(&self, config: ScenarioConfig) -> Result<String> {
        if let Err(error) = config.validate(&self.inner.registry) {
            warn!(%error, "scenario rejected");
            return Err(error);
        }
        let scenario_id = config.scenario_id()?;

        match self.inner.tracker.register(&scenario_id, &config) {
            Registration::Existing => {
                debug!(%scenario_id, "identical scenario already tracked");
            }
            Registration::Created => {
                let (sender, _) = watch::channel(ExecutionStatus::Initialized);
                let run = Run {
                    id: scenario_id.clone(),
                    status: Arc::new(sender),
                };
                self.inner
                    .watchers
                    .insert(scenario_id.clone(), Arc::clone(&run.status));
                self.inner
                    .log(
                        LogLevel::Info,
                        &format!("scenario submitted with {} models", config.models.len()),
                        Some(&scenario_id),
                    )
                    .await;
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.drive(run, config).await });
            }
        }
        Ok(scenario_id)
    }

    /// Current status of an execution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn status(&self, scenario_id: &str) -> Result<StatusReport> {
        self.inner
            .tracker
            .status(scenario_id)
            .ok_or_else(|| Error::NotFound(scenario_id.to_string()))
    }

    /// Composite result of an execution.
    #[must_use]
    pub fn result(&self, scenario_id: &str) -> ResultLookup {
        let Some(execution) = self.inner.tracker.snapshot(scenario_id) else {
            return ResultLookup::NotFound;
        };
        match execution.status() {
            ExecutionStatus::Completed => execution.result().map_or_else(
                || ResultLookup::Failed {
                    reason: "completed without a result".to_string(),
                },
                |result| ResultLookup::Ready(Arc::new(result.clone())),
            ),
            ExecutionStatus::Error => ResultLookup::Failed {
                reason: execution.reason().unwrap_or("unknown error").to_string(),
            },
            _ => ResultLookup::Pending(execution.status_report()),
        }
    }

    /// Visualization artifact of a completed execution.
    ///
    /// Served from the cache; on a miss it is rebuilt from the stored
    /// composite and cached again. Returns `None` while the execution is not
    /// completed, or for the payload of a model that did not succeed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, or
    /// [`Error::Serialization`] if the artifact cannot be encoded.
    pub fn artifact(
        &self,
        scenario_id: &str,
        artifact: ArtifactKind,
    ) -> Result<Option<serde_json::Value>> {
        if let Some(payload) = self.inner.cache.get(scenario_id, artifact) {
            return Ok(Some(payload));
        }
        let execution = self
            .inner
            .tracker
            .snapshot(scenario_id)
            .ok_or_else(|| Error::NotFound(scenario_id.to_string()))?;
        let Some(composite) = execution.result() else {
            return Ok(None);
        };
        let payload = build_artifact(composite, artifact)?;
        if let Some(payload) = &payload {
            debug!(%scenario_id, %artifact, "artifact rebuilt after cache miss");
            self.inner
                .cache
                .put(scenario_id, artifact, payload.clone(), self.inner.config.cache_ttl());
        }
        Ok(payload)
    }

    /// Submit a scenario and wait for it to reach a terminal state.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`Engine::submit`], or
    /// [`Error::ExecutionFailed`] if the execution ends in ERROR.
    pub async fn execute(&self, config: ScenarioConfig) -> Result<Arc<CompositeResult>> {
        let scenario_id = self.submit(config).await?;
        self.wait(&scenario_id).await?;
        match self.result(&scenario_id) {
            ResultLookup::Ready(result) => Ok(result),
            ResultLookup::Failed { reason } => Err(Error::ExecutionFailed {
                scenario_id,
                reason,
            }),
            ResultLookup::Pending(_) | ResultLookup::NotFound => {
                Err(Error::Other(format!("scenario {scenario_id} did not finish")))
            }
        }
    }

    /// Wait until an execution reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub async fn wait(&self, scenario_id: &str) -> Result<ExecutionStatus> {
        let mut receiver = self
            .inner
            .watchers
            .get(scenario_id)
            .map(|sender| sender.subscribe())
            .ok_or_else(|| Error::NotFound(scenario_id.to_string()))?;
        let status = match receiver.wait_for(|status| status.is_terminal()).await {
            Ok(status) => *status,
            Err(_) => self.status(scenario_id)?.status,
        };
        Ok(status)
    }

    /// Retry every parked snapshot. Returns how many are still pending.
    pub async fn retry_pending_saves(&self) -> usize {
        self.inner.retry_pending_saves().await
    }

    /// Drop expired cache entries. Returns how many were removed.
    pub fn purge_cache(&self) -> usize {
        self.inner.cache.purge_expired()
    }
}

impl<S: ScenarioStore + 'static> Inner<S> {
    #[instrument(skip_all, fields(scenario_id = %run.id))]
    async fn drive(self: Arc<Self>, run: Run, config: ScenarioConfig) {
        let scenario_id = run.id.clone();
        let running_phase = {
            let names: Vec<&str> = config.models.iter().map(|m| m.as_str()).collect();
            format!("running: {}", names.join(", "))
        };
        let dispatched = self.transition(&run, |e| {
            e.start()?;
            e.record_progress(DISPATCH_PROGRESS, running_phase)
        });
        match dispatched {
            Ok(snapshot) => self.persist(snapshot).await,
            Err(error) => {
                error!(%error, "dispatch failed");
                self.finish_with_error(&run, error.to_string()).await;
                return;
            }
        }

        let jobs = match self.jobs(&config) {
            Ok(jobs) => jobs,
            Err(error) => {
                self.finish_with_error(&run, error.to_string()).await;
                return;
            }
        };

        let config = Arc::new(config);
        let results = self
            .scheduler
            .run(
                &scenario_id,
                Arc::clone(&config),
                Arc::clone(&self.countries),
                jobs,
                |progress| self.record_model_progress(&run, progress),
            )
            .await;

        for (result, failure) in results.iter().filter_map(|r| r.failure().map(|f| (r, f))) {
            let level = match result.outcome() {
                ModelOutcome::TimedOut => LogLevel::Warning,
                _ => LogLevel::Error,
            };
            self.log(level, &failure.to_string(), Some(&scenario_id)).await;
        }

        if results.iter().all(|r| r.outcome() == ModelOutcome::TimedOut) {
            let error = Error::Timeout {
                context: format!("scenario {scenario_id} produced no model result"),
                elapsed_ms: self.scheduler.execution_timeout().as_millis(),
            };
            self.finish_with_error(&run, error.to_string()).await;
            return;
        }

        if let Err(error) = self.transition(&run, ScenarioExecution::begin_aggregation) {
            self.finish_with_error(&run, error.to_string()).await;
            return;
        }

        let composite = match self
            .aggregator
            .aggregate(&scenario_id, &config, results, Utc::now())
        {
            Ok(composite) => composite,
            Err(error) => {
                self.finish_with_error(&run, error.to_string()).await;
                return;
            }
        };

        self.cache_artifacts(&scenario_id, &composite);
        let degraded = composite.is_degraded();
        let risk = composite.risk_score();
        match self.transition(&run, |e| e.complete(composite)) {
            Ok(snapshot) => {
                let message = if degraded {
                    format!("scenario completed (degraded), risk {risk:.2}")
                } else {
                    format!("scenario completed, risk {risk:.2}")
                };
                let level = if degraded {
                    LogLevel::Warning
                } else {
                    LogLevel::Info
                };
                self.log(level, &message, Some(&scenario_id)).await;
                self.persist_terminal(&run, snapshot).await;
            }
            Err(error) => self.finish_with_error(&run, error.to_string()).await,
        }
    }

    fn jobs(&self, config: &ScenarioConfig) -> Result<Vec<ModelJob>> {
        config
            .models
            .iter()
            .map(|&model| {
                Ok(ModelJob {
                    model,
                    implementation: self.registry.lookup(model)?.implementation(),
                })
            })
            .collect()
    }

    fn record_model_progress(&self, run: &Run, progress: ModelProgress<'_>) {
        let done = progress.completed.min(progress.total);
        let share = usize::from(MODEL_PROGRESS_SPAN) * done / progress.total.max(1);
        let value = DISPATCH_PROGRESS.saturating_add(u8::try_from(share).unwrap_or(MODEL_PROGRESS_SPAN));
        let phase = if progress.in_flight.is_empty() {
            "models finished".to_string()
        } else {
            let names: Vec<&str> = progress.in_flight.iter().map(|m| m.as_str()).collect();
            format!("running: {}", names.join(", "))
        };
        if let Err(error) = self.transition(run, |e| e.record_progress(value, phase)) {
            debug!(%error, "progress update dropped");
        }
    }

    /// Apply a transition. Waiters hear about terminal states only once the
    /// snapshot has been handed to the store, see [`Self::persist_terminal`].
    fn transition<F>(&self, run: &Run, apply: F) -> Result<ScenarioExecution>
    where
        F: FnOnce(&mut ScenarioExecution) -> Result<()>,
    {
        let snapshot = self.tracker.transition(&run.id, apply)?;
        if !snapshot.status().is_terminal() {
            run.status.send_replace(snapshot.status());
        }
        Ok(snapshot)
    }

    async fn persist_terminal(&self, run: &Run, snapshot: ScenarioExecution) {
        let status = snapshot.status();
        self.persist(snapshot).await;
        run.status.send_replace(status);
    }

    async fn finish_with_error(&self, run: &Run, reason: String) {
        match self.transition(run, |e| e.fail(reason.clone())) {
            Ok(snapshot) => {
                self.log(LogLevel::Error, &format!("scenario failed: {reason}"), Some(&run.id))
                    .await;
                self.persist_terminal(run, snapshot).await;
            }
            Err(error) => {
                warn!(scenario_id = %run.id, %error, "could not record failure");
                if let Some(report) = self.tracker.status(&run.id) {
                    run.status.send_replace(report.status);
                }
            }
        }
    }

    fn cache_artifacts(&self, scenario_id: &str, composite: &CompositeResult) {
        let ttl = self.config.cache_ttl();
        let mut kinds = vec![
            ArtifactKind::Composite,
            ArtifactKind::RiskSummary,
            ArtifactKind::Timeline,
        ];
        kinds.extend(composite.participating().into_iter().map(ArtifactKind::ModelPayload));
        for kind in kinds {
            match build_artifact(composite, kind) {
                Ok(Some(payload)) => self.cache.put(scenario_id, kind, payload, ttl),
                Ok(None) => {}
                Err(error) => warn!(%scenario_id, artifact = %kind, %error, "artifact not cached"),
            }
        }
    }

    /// Save a snapshot, first flushing parked ones. On failure the snapshot
    /// replaces any parked snapshot of the same scenario.
    async fn persist(&self, snapshot: ScenarioExecution) {
        self.retry_pending_saves().await;
        if let Err(error) = self.store.save_execution(&snapshot).await {
            warn!(scenario_id = snapshot.scenario_id(), %error, "save failed, snapshot parked");
            self.pending_saves
                .insert(snapshot.scenario_id().to_string(), snapshot);
        }
    }

    async fn retry_pending_saves(&self) -> usize {
        let parked: Vec<ScenarioExecution> = self
            .pending_saves
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for snapshot in parked {
            if self.store.save_execution(&snapshot).await.is_ok() {
                // Keep a newer snapshot parked meanwhile.
                self.pending_saves.remove_if(snapshot.scenario_id(), |_, current| {
                    current.updated_at() <= snapshot.updated_at()
                });
                debug!(scenario_id = snapshot.scenario_id(), "parked snapshot saved");
            }
        }
        self.pending_saves.len()
    }

    /// Emit a tracing event and mirror it to the store's log.
    async fn log(&self, level: LogLevel, message: &str, scenario_id: Option<&str>) {
        let id = scenario_id.unwrap_or("-");
        match level {
            LogLevel::Debug => debug!(scenario_id = id, "{message}"),
            LogLevel::Info => info!(scenario_id = id, "{message}"),
            LogLevel::Warning => warn!(scenario_id = id, "{message}"),
            LogLevel::Error => error!(scenario_id = id, "{message}"),
        }
        if let Err(error) = self.store.append_log(level, message, scenario_id).await {
            debug!(%error, "log line not persisted");
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

fn build_artifact(
    composite: &CompositeResult,
    artifact: ArtifactKind,
) -> Result<Option<serde_json::Value>> {
    match artifact {
        ArtifactKind::Composite => to_value(composite),
        ArtifactKind::RiskSummary => to_value(composite.risk()),
        ArtifactKind::Timeline => to_value(&composite.timeline()),
        ArtifactKind::ModelPayload(model) => Ok(model_payload(composite, model)),
    }
}

fn model_payload(composite: &CompositeResult, model: ModelKind) -> Option<serde_json::Value> {
    composite
        .results()
        .get(&model)
        .filter(|r| r.is_success())
        .map(|r| r.payload().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{EnvironmentType, Intensity};
    use crate::scheduler::test_models::{FailingModel, SlowModel};
    use std::time::Duration;

    fn city(models: &[ModelKind]) -> ScenarioConfig {
        ScenarioConfig::new(EnvironmentType::MediumCity, 100_000)
            .intensity(Intensity::High)
            .models(models.iter().copied())
    }

    async fn engine_with(registry: ModelRegistry, config: EngineConfig) -> Engine {
        Engine::start(config, registry, MemoryStore::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_execute_completes_with_progress_100() {
        let engine = Engine::in_memory().await.unwrap();
        let result = engine.execute(city(&ModelKind::ALL)).await.unwrap();
        assert!(!result.is_degraded());

        let status = engine.status(result.scenario_id()).unwrap();
        assert_eq!(status.status, ExecutionStatus::Completed);
        assert_eq!(status.progress, 100);
        assert!(engine.store().execution(result.scenario_id()).is_some());
    }

    #[tokio::test]
    async fn test_resubmit_returns_same_id() {
        let engine = Engine::in_memory().await.unwrap();
        let first = engine.submit(city(&[ModelKind::Economic])).await.unwrap();
        let second = engine.submit(city(&[ModelKind::Economic])).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.scenario_ids().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_creates_nothing() {
        let engine = Engine::in_memory().await.unwrap();
        let config = ScenarioConfig::new(EnvironmentType::Village, 50_000_000).model(ModelKind::Social);
        assert!(matches!(engine.submit(config).await, Err(Error::Validation(_))));
        assert!(engine.scenario_ids().is_empty());
    }

    #[tokio::test]
    async fn test_all_models_failing_ends_in_error() {
        let mut registry = ModelRegistry::with_default_models();
        registry.register_model(FailingModel(ModelKind::Economic));
        let engine = engine_with(registry, EngineConfig::default()).await;

        let err = engine.execute(city(&[ModelKind::Economic])).await.unwrap_err();
        assert!(matches!(err, Error::ExecutionFailed { .. }));
        let id = engine.scenario_ids().remove(0);
        let status = engine.status(&id).unwrap();
        assert_eq!(status.status, ExecutionStatus::Error);
        assert!(status.reason.unwrap().contains("Aggregation failed"));
        assert!(status.progress >= DISPATCH_PROGRESS);
        assert!(matches!(engine.result(&id), ResultLookup::Failed { .. }));
    }

    #[tokio::test]
    async fn test_timeout_with_no_result_reports_timeout() {
        let mut registry = ModelRegistry::with_default_models();
        registry.register_model(SlowModel(ModelKind::Military));
        let config = EngineConfig::builder()
            .execution_timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let engine = engine_with(registry, config).await;

        let err = engine.execute(city(&[ModelKind::Military])).await.unwrap_err();
        assert!(err.to_string().contains("Timed out"));
    }

    #[tokio::test]
    async fn test_artifacts_cached_on_completion() {
        let engine = Engine::in_memory().await.unwrap();
        let result = engine
            .execute(city(&[ModelKind::Military, ModelKind::Economic]))
            .await
            .unwrap();
        let id = result.scenario_id();
        for kind in [
            ArtifactKind::Composite,
            ArtifactKind::RiskSummary,
            ArtifactKind::Timeline,
            ArtifactKind::ModelPayload(ModelKind::Economic),
        ] {
            assert!(engine.cache().get(id, kind).is_some(), "{kind} cached");
        }
        assert!(engine
            .artifact(id, ArtifactKind::ModelPayload(ModelKind::Social))
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_artifact_rebuilt_after_invalidation() {
        let engine = Engine::in_memory().await.unwrap();
        let result = engine.execute(city(&[ModelKind::Social])).await.unwrap();
        let id = result.scenario_id();
        engine.cache().invalidate(id);

        let risk = engine.artifact(id, ArtifactKind::RiskSummary).unwrap().unwrap();
        assert!(risk.get("level").is_some());
        assert!(engine.cache().get(id, ArtifactKind::RiskSummary).is_some());
        assert!(matches!(
            engine.artifact("scn-unknown", ArtifactKind::Composite),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_store_parks_snapshots() {
        let engine = Engine::in_memory().await.unwrap();
        engine.store().set_available(false);
        let result = engine.execute(city(&[ModelKind::Economic])).await.unwrap();
        assert_eq!(engine.pending_saves(), 1);

        engine.store().set_available(true);
        assert_eq!(engine.retry_pending_saves().await, 0);
        let saved = engine.store().execution(result.scenario_id()).unwrap();
        assert_eq!(saved.status(), ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn test_lifecycle_mirrored_to_store_log() {
        let engine = Engine::in_memory().await.unwrap();
        let result = engine.execute(city(&[ModelKind::Economic])).await.unwrap();
        let logs = engine.store().logs_for(result.scenario_id());
        assert!(logs.iter().any(|l| l.message.contains("submitted")));
        assert!(logs.iter().any(|l| l.message.contains("completed")));
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let engine = Engine::in_memory().await.unwrap();
        assert!(matches!(engine.status("nope"), Err(Error::NotFound(_))));
        assert_eq!(engine.result("nope"), ResultLookup::NotFound);
        assert!(engine.wait("nope").await.is_err());
    }
}
