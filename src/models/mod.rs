//! Domain model units
//!
//! Every domain model implements [`DomainModel`]: a pure function of the
//! scenario configuration and the country reference set. Models share no
//! mutable state, so the scheduler runs them concurrently on the blocking
//! pool. A model checks its [`CancellationToken`] once per simulated day and
//! stops with [`ModelError::Cancelled`] when the execution gives up on it.
//!
//! ## Headline payload fields
//!
//! ```text
//! military        casualties, escalation_index
//! economic        damage_usd, gdp_impact_percent
//! social          displaced, displacement_rate_percent, unrest_probability
//! infrastructure  service_disruption, recovery_days
//! ```
//!
//! The aggregator's interaction rules read and adjust these fields.

mod economic;
mod infrastructure;
mod military;
mod result;
mod social;

pub use economic::EconomicModel;
pub use infrastructure::InfrastructureModel;
pub use military::MilitaryModel;
pub use result::{ModelOutcome, ModelResult};
pub use social::SocialModel;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scenario::{CountryRecord, EnvironmentType, ModelKind, ScenarioConfig};

/// Cooperative cancellation signal shared between the scheduler and one
/// model invocation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Errors a model may report. Contained by the scheduler and recorded as a
/// failed or timed-out outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The execution cancelled this model
    #[error("cancelled")]
    Cancelled,

    /// Internal model failure
    #[error("{0}")]
    Failed(String),
}

/// Inputs available to a model invocation.
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    /// Scenario being analysed
    pub config: &'a ScenarioConfig,
    /// Shared country reference data
    pub countries: &'a [CountryRecord],
    /// Cancellation signal for this invocation
    pub cancel: &'a CancellationToken,
}

impl ModelContext<'_> {
    /// Return [`ModelError::Cancelled`] if cancellation has been signalled.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` once the token fired.
    pub fn checkpoint(&self) -> Result<(), ModelError> {
        if self.cancel.is_cancelled() {
            Err(ModelError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Population as a float.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn population(&self) -> f64 {
        self.config.population as f64
    }
}

/// Raw output of a successful model run, before the scheduler attaches
/// timing and outcome metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    /// Opaque structured payload
    pub payload: serde_json::Value,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Model-specific severity indicator in `[0, 1]`
    pub severity: f64,
    /// Estimated memory usage in megabytes
    pub memory_mb: f64,
}

/// Capability descriptor published in the registry.
///
/// Runtime and memory estimates feed progress display only, never
/// scheduling decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    name: String,
    environments: BTreeSet<EnvironmentType>,
    min_runtime_ms: u64,
    max_runtime_ms: u64,
    memory_mb: u32,
}

impl ModelDescriptor {
    /// Create a descriptor supporting every environment type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environments: EnvironmentType::ALL.into_iter().collect(),
            min_runtime_ms: 0,
            max_runtime_ms: 0,
            memory_mb: 0,
        }
    }

    /// Restrict the supported environment types.
    #[must_use]
    pub fn environments(mut self, environments: impl IntoIterator<Item = EnvironmentType>) -> Self {
        self.environments = environments.into_iter().collect();
        self
    }

    /// Set the estimated runtime range.
    #[must_use]
    pub fn runtime(mut self, min: Duration, max: Duration) -> Self {
        self.min_runtime_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
        self.max_runtime_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the estimated memory footprint.
    #[must_use]
    pub const fn memory_mb(mut self, memory_mb: u32) -> Self {
        self.memory_mb = memory_mb;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the model supports an environment type.
    #[must_use]
    pub fn supports(&self, environment: EnvironmentType) -> bool {
        self.environments.contains(&environment)
    }

    /// Supported environment types.
    #[must_use]
    pub const fn supported_environments(&self) -> &BTreeSet<EnvironmentType> {
        &self.environments
    }

    /// Estimated runtime range.
    #[must_use]
    pub const fn runtime_estimate(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_runtime_ms),
            Duration::from_millis(self.max_runtime_ms),
        )
    }

    /// Estimated memory in megabytes.
    #[must_use]
    pub const fn estimated_memory_mb(&self) -> u32 {
        self.memory_mb
    }
}

/// Contract implemented by every domain model.
pub trait DomainModel: Send + Sync {
    /// Identifier this implementation answers for.
    fn kind(&self) -> ModelKind;

    /// Capability descriptor.
    fn descriptor(&self) -> ModelDescriptor;

    /// Evaluate the scenario.
    ///
    /// Must be a pure function of `ctx.config` and `ctx.countries`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] on internal failure or cancellation.
    fn run(&self, ctx: &ModelContext<'_>) -> Result<ModelReport, ModelError>;
}

/// Mean GDP per capita (USD) over the reference set, used to size local
/// economies.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_gdp_per_capita(countries: &[CountryRecord]) -> f64 {
    const FALLBACK_USD: f64 = 12_000.0;
    let per_capita: Vec<f64> = countries
        .iter()
        .filter(|c| c.population() > 0)
        .map(|c| c.gdp_trillion_usd() * 1e12 / c.population() as f64)
        .collect();
    if per_capita.is_empty() {
        FALLBACK_USD
    } else {
        per_capita.iter().sum::<f64>() / per_capita.len() as f64
    }
}
