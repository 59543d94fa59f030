//! Cross-model interaction rules
//!
//! Rules run once each, in table order, over a working copy of the
//! successful models' headline metrics. A rule may read values written by
//! earlier rules but is never re-evaluated, so the table cannot cycle.
//!
//! | # | Rule                        | Requires                 | Effect                                             |
//! |---|-----------------------------|--------------------------|----------------------------------------------------|
//! | 1 | `nuclear_escalation`        | flag, military, economic | damage ×2.5; social: displaced += 25% population   |
//! | 2 | `military_economic`         | military, economic       | damage × (1 + casualties/100k × 0.5)               |
//! | 3 | `supply_chain_shock`        | flag, economic           | damage ×1.35; infrastructure: recovery ×1.2        |
//! | 4 | `climate_stress`            | flag, infrastructure     | disruption ×1.25 (≤1); social: displaced ×1.15     |
//! | 5 | `population_infrastructure` | social, infrastructure   | recovery × (1 + displaced/100k × 0.3)              |
//! | 6 | `economic_social`           | economic, social         | unrest × (1 + gdp%/10 × 0.8) (≤1)                  |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::scenario::{ModelKind, ScenarioConfig};

/// Headline metrics per model, adjusted in place by the rules.
pub type MetricTable = BTreeMap<ModelKind, BTreeMap<String, f64>>;

/// Nuclear escalation damage multiplier.
pub const NUCLEAR_DAMAGE_FACTOR: f64 = 2.5;
/// Share of the population displaced by nuclear escalation.
pub const NUCLEAR_DISPLACEMENT_SURGE: f64 = 0.25;
/// Supply chain damage multiplier.
pub const SUPPLY_CHAIN_DAMAGE_FACTOR: f64 = 1.35;
/// Supply chain recovery delay multiplier.
pub const SUPPLY_CHAIN_RECOVERY_FACTOR: f64 = 1.2;
/// Climate stress disruption multiplier.
pub const CLIMATE_DISRUPTION_FACTOR: f64 = 1.25;
/// Climate stress displacement multiplier.
pub const CLIMATE_DISPLACEMENT_FACTOR: f64 = 1.15;

/// One recorded adjustment of a model metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEffect {
    /// Rule that produced the adjustment
    pub rule: String,
    /// Models whose presence triggered the rule
    pub sources: Vec<ModelKind>,
    /// Model whose metric was adjusted
    pub target: ModelKind,
    /// Adjusted metric
    pub field: String,
    /// Value before the adjustment
    pub before: f64,
    /// Value after the adjustment
    pub after: f64,
    /// Additive change `after - before`
    pub delta: f64,
    /// Effective multiplier `after / before`; `None` from a zero base, where
    /// only `delta` describes the change
    pub factor: Option<f64>,
}

/// Mutable view handed to a rule while it applies.
pub struct RuleContext<'a> {
    config: &'a ScenarioConfig,
    metrics: &'a mut MetricTable,
    rule: &'static str,
    sources: &'static [ModelKind],
    effects: Vec<InteractionEffect>,
}

impl RuleContext<'_> {
    /// Scenario being aggregated.
    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        self.config
    }

    /// Whether a model succeeded (has metrics).
    #[must_use]
    pub fn has(&self, model: ModelKind) -> bool {
        self.metrics.contains_key(&model)
    }

    /// Read a metric, if the model succeeded and reported it.
    #[must_use]
    pub fn get(&self, model: ModelKind, field: &str) -> Option<f64> {
        self.metrics.get(&model)?.get(field).copied()
    }

    /// Replace a metric through `update`, recording the effect. Missing
    /// metrics are skipped.
    pub fn update(&mut self, model: ModelKind, field: &str, update: impl FnOnce(f64) -> f64) {
        let Some(value) = self.metrics.get_mut(&model).and_then(|m| m.get_mut(field)) else {
            return;
        };
        let before = *value;
        let after = update(before);
        *value = after;
        let factor = (before.abs() > f64::EPSILON).then(|| after / before);
        self.effects.push(InteractionEffect {
            rule: self.rule.to_string(),
            sources: self.sources.to_vec(),
            target: model,
            field: field.to_string(),
            before,
            after,
            delta: after - before,
            factor,
        });
    }

    /// Multiply a metric by `factor`.
    pub fn scale(&mut self, model: ModelKind, field: &str, factor: f64) {
        self.update(model, field, |v| v * factor);
    }
}

/// A single interaction rule.
#[derive(Clone, Copy)]
pub struct InteractionRule {
    /// Rule name
    pub name: &'static str,
    /// Models that must have succeeded
    pub requires: &'static [ModelKind],
    /// Severity contributed to the risk score when triggered
    pub severity: f64,
    /// Configuration predicate
    pub when: fn(&ScenarioConfig) -> bool,
    /// Adjustment
    pub apply: fn(&mut RuleContext<'_>),
}

impl std::fmt::Debug for InteractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRule")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl InteractionRule {
    /// Whether the rule's predicate holds for this configuration and success set.
    #[must_use]
    pub fn matches(&self, config: &ScenarioConfig, succeeded: &BTreeSet<ModelKind>) -> bool {
        self.requires.iter().all(|m| succeeded.contains(m)) && (self.when)(config)
    }
}

/// Rule outcome summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredRule {
    /// Rule name
    pub name: String,
    /// Rule severity
    pub severity: f64,
}

/// Apply `rules` in order to `metrics`.
///
/// Returns the rules that produced at least one effect and every effect in
/// application order.
pub fn apply_rules(
    rules: &[InteractionRule],
    config: &ScenarioConfig,
    metrics: &mut MetricTable,
) -> (Vec<TriggeredRule>, Vec<InteractionEffect>) {
    let succeeded: BTreeSet<ModelKind> = metrics.keys().copied().collect();
    let mut triggered = Vec::new();
    let mut effects = Vec::new();

    for rule in rules {
        if !rule.matches(config, &succeeded) {
            continue;
        }
        let mut ctx = RuleContext {
            config,
            metrics,
            rule: rule.name,
            sources: rule.requires,
            effects: Vec::new(),
        };
        (rule.apply)(&mut ctx);
        if !ctx.effects.is_empty() {
            triggered.push(TriggeredRule {
                name: rule.name.to_string(),
                severity: rule.severity,
            });
            effects.append(&mut ctx.effects);
        }
    }
    (triggered, effects)
}

/// The built-in ordered rule table.
#[must_use]
pub fn default_rules() -> Vec<InteractionRule> {
    use ModelKind::{Economic, Infrastructure, Military, Social};

    vec![
        InteractionRule {
            name: "nuclear_escalation",
            requires: &[Military, Economic],
            severity: 1.0,
            when: |c| c.nuclear_escalation,
            apply: |ctx| {
                ctx.scale(Economic, "damage_usd", NUCLEAR_DAMAGE_FACTOR);
                if ctx.has(Social) {
                    #[allow(clippy::cast_precision_loss)]
                    let population = ctx.config().population as f64;
                    let surge = population * NUCLEAR_DISPLACEMENT_SURGE;
                    ctx.update(Social, "displaced", |d| (d + surge).min(population));
                }
            },
        },
        InteractionRule {
            name: "military_economic",
            requires: &[Military, Economic],
            severity: 0.6,
            when: |_| true,
            apply: |ctx| {
                if let Some(casualties) = ctx.get(Military, "casualties") {
                    let factor = 1.0 + casualties / 100_000.0 * 0.5;
                    ctx.scale(Economic, "damage_usd", factor);
                }
            },
        },
        InteractionRule {
            name: "supply_chain_shock",
            requires: &[Economic],
            severity: 0.5,
            when: |c| c.supply_chain_impact,
            apply: |ctx| {
                ctx.scale(Economic, "damage_usd", SUPPLY_CHAIN_DAMAGE_FACTOR);
                if ctx.has(Infrastructure) {
                    ctx.scale(Infrastructure, "recovery_days", SUPPLY_CHAIN_RECOVERY_FACTOR);
                }
            },
        },
        InteractionRule {
            name: "climate_stress",
            requires: &[Infrastructure],
            severity: 0.5,
            when: |c| c.climate_effects,
            apply: |ctx| {
                ctx.update(Infrastructure, "service_disruption", |d| {
                    (d * CLIMATE_DISRUPTION_FACTOR).min(1.0)
                });
                if ctx.has(Social) {
                    #[allow(clippy::cast_precision_loss)]
                    let population = ctx.config().population as f64;
                    ctx.update(Social, "displaced", |d| {
                        (d * CLIMATE_DISPLACEMENT_FACTOR).min(population)
                    });
                }
            },
        },
        InteractionRule {
            name: "population_infrastructure",
            requires: &[Social, Infrastructure],
            severity: 0.4,
            when: |_| true,
            apply: |ctx| {
                if let Some(displaced) = ctx.get(Social, "displaced") {
                    let factor = 1.0 + displaced / 100_000.0 * 0.3;
                    ctx.scale(Infrastructure, "recovery_days", factor);
                }
            },
        },
        InteractionRule {
            name: "economic_social",
            requires: &[Economic, Social],
            severity: 0.4,
            when: |_| true,
            apply: |ctx| {
                if let Some(gdp_impact) = ctx.get(Economic, "gdp_impact_percent") {
                    let factor = 1.0 + gdp_impact / 10.0 * 0.8;
                    ctx.update(Social, "unrest_probability", |u| (u * factor).min(1.0));
                }
            },
        },
    ]
}
