//! Scenario configuration
//!
//! A [`ScenarioConfig`] describes the event being analysed: environment
//! scale, affected population, intensity, duration, the domain models to run
//! and the boolean modifiers that switch cross-model interaction rules on.
//!
//! ## Usage
//!
//! ```rust
//! use scenario_engine::scenario::{EnvironmentType, Intensity, ModelKind, ScenarioConfig};
//!
//! let config = ScenarioConfig::new(EnvironmentType::MediumCity, 100_000)
//!     .intensity(Intensity::High)
//!     .duration_days(30)
//!     .model(ModelKind::Military)
//!     .model(ModelKind::Economic)
//!     .nuclear_escalation(true);
//!
//! assert!(config.population_in_range());
//! ```

mod country;
pub mod presets;

pub use country::{default_countries, CountryRecord};

use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hasher;
use std::ops::RangeInclusive;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::registry::ModelRegistry;
use crate::{Error, Result};

/// Environment scale of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentType {
    /// Rural village
    Village,
    /// Small town
    Town,
    /// Medium city
    MediumCity,
    /// Large city
    LargeCity,
    /// Megacity / metropolitan area
    Megacity,
    /// Multi-city region or province
    Region,
    /// Whole nation
    Nation,
    /// Worldwide
    Global,
}

impl EnvironmentType {
    /// Every environment type, smallest first.
    pub const ALL: [Self; 8] = [
        Self::Village,
        Self::Town,
        Self::MediumCity,
        Self::LargeCity,
        Self::Megacity,
        Self::Region,
        Self::Nation,
        Self::Global,
    ];

    /// Admissible population range for this environment type.
    #[must_use]
    pub const fn population_range(self) -> RangeInclusive<u64> {
        match self {
            Self::Village => 500..=5_000,
            Self::Town => 5_000..=25_000,
            Self::MediumCity => 25_000..=250_000,
            Self::LargeCity => 250_000..=1_000_000,
            Self::Megacity => 1_000_000..=20_000_000,
            Self::Region => 1_000_000..=100_000_000,
            Self::Nation => 100_000..=1_500_000_000,
            Self::Global => 1_000_000_000..=8_500_000_000,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Village => "Rural Village",
            Self::Town => "Town",
            Self::MediumCity => "Medium City",
            Self::LargeCity => "Large City",
            Self::Megacity => "Megacity",
            Self::Region => "Region",
            Self::Nation => "Nation",
            Self::Global => "Global",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Event intensity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Low intensity
    Low,
    /// Medium intensity
    #[default]
    Medium,
    /// High intensity
    High,
    /// Extreme intensity
    Extreme,
}

impl Intensity {
    /// Scalar weight in `(0, 1]` used by the built-in models.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Low => 0.25,
            Self::Medium => 0.5,
            Self::High => 0.75,
            Self::Extreme => 1.0,
        }
    }
}

/// Domain model identifier.
///
/// The derived ordering is the fixed identifier order in which results are
/// aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Military conflict analysis
    #[serde(alias = "military_analysis")]
    Military,
    /// Economic impact assessment
    #[serde(alias = "economic_impact")]
    Economic,
    /// Population and social impact
    #[serde(alias = "population_impact", alias = "population")]
    Social,
    /// Infrastructure and environmental analysis
    #[serde(alias = "infrastructure_analysis", alias = "environmental")]
    Infrastructure,
}

impl ModelKind {
    /// Every model identifier in aggregation order.
    pub const ALL: [Self; 4] = [
        Self::Military,
        Self::Economic,
        Self::Social,
        Self::Infrastructure,
    ];

    /// Stable identifier string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Military => "military",
            Self::Economic => "economic",
            Self::Social => "social",
            Self::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scenario configuration submitted to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Environment scale
    pub environment: EnvironmentType,
    /// Affected population
    pub population: u64,
    /// Event intensity
    #[serde(default)]
    pub intensity: Intensity,
    /// Duration in days (must be positive)
    pub duration_days: u32,
    /// Selected domain models
    pub models: BTreeSet<ModelKind>,
    /// Nuclear escalation modifier
    #[serde(default)]
    pub nuclear_escalation: bool,
    /// Supply chain disruption modifier
    #[serde(default)]
    pub supply_chain_impact: bool,
    /// Climate effects modifier
    #[serde(default)]
    pub climate_effects: bool,
}

impl ScenarioConfig {
    /// Create a configuration with medium intensity, a 30 day duration,
    /// no models and no modifiers.
    #[must_use]
    pub const fn new(environment: EnvironmentType, population: u64) -> Self {
        Self {
            name: None,
            environment,
            population,
            intensity: Intensity::Medium,
            duration_days: 30,
            models: BTreeSet::new(),
            nuclear_escalation: false,
            supply_chain_impact: false,
            climate_effects: false,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the intensity.
    #[must_use]
    pub const fn intensity(mut self, intensity: Intensity) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the duration in days.
    #[must_use]
    pub const fn duration_days(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }

    /// Add a model to the selection.
    #[must_use]
    pub fn model(mut self, model: ModelKind) -> Self {
        self.models.insert(model);
        self
    }

    /// Replace the model selection.
    #[must_use]
    pub fn models(mut self, models: impl IntoIterator<Item = ModelKind>) -> Self {
        self.models = models.into_iter().collect();
        self
    }

    /// Set the nuclear escalation modifier.
    #[must_use]
    pub const fn nuclear_escalation(mut self, on: bool) -> Self {
        self.nuclear_escalation = on;
        self
    }

    /// Set the supply chain modifier.
    #[must_use]
    pub const fn supply_chain_impact(mut self, on: bool) -> Self {
        self.supply_chain_impact = on;
        self
    }

    /// Set the climate effects modifier.
    #[must_use]
    pub const fn climate_effects(mut self, on: bool) -> Self {
        self.climate_effects = on;
        self
    }

    /// Whether the population falls within the environment's range.
    #[must_use]
    pub fn population_in_range(&self) -> bool {
        self.environment.population_range().contains(&self.population)
    }

    /// Validate the configuration against the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for out-of-range population, zero
    /// duration, an empty model selection or a model that does not support
    /// the environment, and [`Error::ModelNotFound`] for an unregistered model.
    pub fn validate(&self, registry: &ModelRegistry) -> Result<()> {
        if !self.population_in_range() {
            let range = self.environment.population_range();
            return Err(Error::Validation(format!(
                "population {} outside {} range {}..={}",
                self.population,
                self.environment.display_name(),
                range.start(),
                range.end()
            )));
        }
        if self.duration_days == 0 {
            return Err(Error::Validation(
                "duration_days must be positive".to_string(),
            ));
        }
        if self.models.is_empty() {
            return Err(Error::Validation(
                "at least one model must be selected".to_string(),
            ));
        }
        for &model in &self.models {
            let entry = registry.lookup(model)?;
            if !entry.descriptor().supports(self.environment) {
                return Err(Error::Validation(format!(
                    "model {model} does not support environment {}",
                    self.environment.display_name()
                )));
            }
        }
        Ok(())
    }

    /// Canonical JSON form (fields and model set in fixed order).
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Scenario id derived from the canonical JSON, so identical
    /// configurations map to the same id.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn scenario_id(&self) -> Result<String> {
        let mut hasher = FxHasher::default();
        hasher.write(self.canonical_json()?.as_bytes());
        Ok(format!("scn-{:016x}", hasher.finish()))
    }
}
