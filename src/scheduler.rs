//! Concurrent model scheduler
//!
//! Every model of an execution is spawned into one `JoinSet`. A model first
//! waits for a permit from the semaphore shared by all executions, then runs
//! on tokio's blocking pool. The permit moves into the blocking closure and
//! is released when the model returns, even if the execution has already
//! stopped waiting for it.
//!
//! The execution waits for outcomes until its global deadline. At the
//! deadline every model's [`CancellationToken`] fires and models without an
//! outcome are recorded as timed out. An optional per-model timeout bounds
//! each invocation from the moment it gets its permit.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument, warn};

use crate::models::{CancellationToken, DomainModel, ModelContext, ModelError, ModelResult};
use crate::scenario::{CountryRecord, ModelKind, ScenarioConfig};

/// One model invocation to schedule.
#[derive(Clone)]
pub struct ModelJob {
    /// Model identifier
    pub model: ModelKind,
    /// Implementation to run
    pub implementation: Arc<dyn DomainModel>,
}

impl std::fmt::Debug for ModelJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelJob")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Progress notification passed to the caller after each outcome.
#[derive(Debug, Clone, Copy)]
pub struct ModelProgress<'a> {
    /// Outcome just recorded
    pub result: &'a ModelResult,
    /// Outcomes recorded so far
    pub completed: usize,
    /// Models scheduled
    pub total: usize,
    /// Models still without an outcome
    pub in_flight: &'a BTreeSet<ModelKind>,
}

/// Runs the models of executions under a shared concurrency bound.
#[derive(Debug, Clone)]
pub struct Scheduler {
    permits: Arc<Semaphore>,
    execution_timeout: Duration,
    model_timeout: Option<Duration>,
}

impl Scheduler {
    /// Create a scheduler.
    #[must_use]
    pub fn new(
        max_concurrent_models: usize,
        execution_timeout: Duration,
        model_timeout: Option<Duration>,
    ) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent_models)),
            execution_timeout,
            model_timeout,
        }
    }

    /// Permits not currently held by a running model.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Global execution timeout.
    #[must_use]
    pub const fn execution_timeout(&self) -> Duration {
        self.execution_timeout
    }

    /// Run every job and return one result per job, in identifier order.
    ///
    /// `on_progress` is called after each outcome, in completion order.
    /// Model failures never abort the run.
    #[instrument(skip_all, fields(scenario_id = %scenario_id, models = jobs.len()))]
    pub async fn run<F>(
        &self,
        scenario_id: &str,
        config: Arc<ScenarioConfig>,
        countries: Arc<Vec<CountryRecord>>,
        jobs: Vec<ModelJob>,
        mut on_progress: F,
    ) -> Vec<ModelResult>
    where
        F: FnMut(ModelProgress<'_>),
    {
        let started = Instant::now();
        let deadline = deadline_after(started, self.execution_timeout);
        let total = jobs.len();

        let mut tokens: FxHashMap<ModelKind, CancellationToken> = FxHashMap::default();
        let mut in_flight: BTreeSet<ModelKind> = BTreeSet::new();
        let mut set = JoinSet::new();

        for job in jobs {
            let token = CancellationToken::new();
            tokens.insert(job.model, token.clone());
            in_flight.insert(job.model);
            set.spawn(invoke(
                job,
                Arc::clone(&self.permits),
                Arc::clone(&config),
                Arc::clone(&countries),
                token,
                self.model_timeout,
            ));
        }

        let mut results: Vec<ModelResult> = Vec::with_capacity(total);
        loop {
            match timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok(result))) => {
                    in_flight.remove(&result.model());
                    debug!(model = %result.model(), outcome = ?result.outcome(), "model finished");
                    on_progress(ModelProgress {
                        result: &result,
                        completed: results.len() + 1,
                        total,
                        in_flight: &in_flight,
                    });
                    results.push(result);
                }
                Ok(Some(Err(join_error))) => {
                    warn!(error = %join_error, "model task aborted");
                }
                Ok(None) => break,
                Err(_elapsed) => {
                    warn!(
                        pending = in_flight.len(),
                        timeout_ms = self.execution_timeout.as_millis(),
                        "execution deadline reached"
                    );
                    for token in tokens.values() {
                        token.cancel();
                    }
                    set.abort_all();
                    break;
                }
            }
        }

        // Deadline expiry or an aborted task leaves models without an outcome.
        let elapsed = started.elapsed();
        for model in std::mem::take(&mut in_flight) {
            let result = if Instant::now() >= deadline {
                ModelResult::timed_out(model, elapsed)
            } else {
                ModelResult::failed(model, "model task aborted", elapsed)
            };
            on_progress(ModelProgress {
                result: &result,
                completed: results.len() + 1,
                total,
                in_flight: &in_flight,
            });
            results.push(result);
        }

        results.sort_by_key(ModelResult::model);
        results
    }
}

/// Roughly 30 years; stands in for deadlines past the clock's range.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(start: Instant, limit: Duration) -> Instant {
    start
        .checked_add(limit)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

async fn invoke(
    job: ModelJob,
    permits: Arc<Semaphore>,
    config: Arc<ScenarioConfig>,
    countries: Arc<Vec<CountryRecord>>,
    token: CancellationToken,
    model_timeout: Option<Duration>,
) -> ModelResult {
    let queued = Instant::now();
    let Ok(permit) = permits.acquire_owned().await else {
        return ModelResult::failed(job.model, "scheduler closed", queued.elapsed());
    };

    let started = Instant::now();
    let model = job.model;
    let cancel = token.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let ctx = ModelContext {
            config: &config,
            countries: &countries,
            cancel: &cancel,
        };
        job.implementation.run(&ctx)
    });

    let outcome = match model_timeout {
        Some(limit) => match timeout_at(deadline_after(started, limit), handle).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                token.cancel();
                return ModelResult::timed_out(model, started.elapsed());
            }
        },
        None => handle.await,
    };

    let elapsed = started.elapsed();
    match outcome {
        Ok(Ok(report)) => ModelResult::success(model, report, elapsed),
        Ok(Err(ModelError::Cancelled)) => ModelResult::timed_out(model, elapsed),
        Ok(Err(error)) => ModelResult::failed(model, error.to_string(), elapsed),
        Err(join_error) => ModelResult::failed(model, format!("model panicked: {join_error}"), elapsed),
    }
}
