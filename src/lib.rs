//! # Scenario Engine: Concurrent Impact Scenario Orchestration
//!
//! **Version**: 0.1.0
//!
//! Runs independent domain models (military, economic, social,
//! infrastructure) concurrently over one scenario, tracks the execution
//! through a progress state machine, and merges the model outputs into a
//! composite assessment with cross-model interaction effects.
//!
//! ## Design Principles
//!
//! - **Bounded concurrency**: one semaphore shared by every execution limits
//!   running models; models run on tokio's blocking pool
//! - **Graceful degradation**: failed or timed-out models are recorded, and
//!   the composite is built from whatever succeeded
//! - **Determinism**: aggregation is a pure function of its inputs, so
//!   identical inputs serialize to identical JSON
//! - **Single writer**: execution records are mutated only through
//!   transition functions; readers get snapshots
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scenario_engine::{Engine, EnvironmentType, Intensity, ModelKind, ScenarioConfig};
//!
//! # async fn example() -> scenario_engine::Result<()> {
//! let engine = Engine::in_memory().await?;
//!
//! let config = ScenarioConfig::new(EnvironmentType::MediumCity, 100_000)
//!     .intensity(Intensity::High)
//!     .models([ModelKind::Military, ModelKind::Economic])
//!     .nuclear_escalation(true);
//!
//! let composite = engine.execute(config).await?;
//! println!("risk {:.2} ({})", composite.risk_score(), composite.risk().level);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod models;
pub mod registry;
pub mod scenario;
pub mod scheduler;
pub mod store;
pub mod telemetry;

pub use aggregate::{Aggregator, CompositeResult, InteractionEffect, RiskAssessment, RiskLevel};
pub use cache::{ArtifactKind, ResultCache};
pub use config::EngineConfig;
pub use engine::{Engine, ResultLookup};
pub use error::{Error, Result};
pub use execution::{ExecutionStatus, ScenarioExecution, StatusReport};
pub use models::{DomainModel, ModelOutcome, ModelResult};
pub use registry::ModelRegistry;
pub use scenario::{presets, EnvironmentType, Intensity, ModelKind, ScenarioConfig};
pub use store::{LogLevel, MemoryStore, ScenarioStore};
