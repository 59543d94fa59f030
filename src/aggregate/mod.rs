//! Composite aggregation
//!
//! Merges the model results of one execution into a [`CompositeResult`]:
//!
//! 1. successful results are collected in model identifier order
//! 2. the ordered interaction rule table adjusts their headline metrics
//! 3. risk, confidence and timeline are derived from the adjusted metrics
//!
//! Aggregation is a pure function of its inputs. The generation timestamp is
//! passed in, so identical inputs serialize to identical JSON.

pub mod risk;
pub mod rules;
pub mod timeline;

pub use risk::{Recommendations, RiskAssessment, RiskLevel};
pub use rules::{
    apply_rules, default_rules, InteractionEffect, InteractionRule, MetricTable, RuleContext,
    TriggeredRule,
};
pub use timeline::TimelinePhase;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ModelResult;
use crate::scenario::{ModelKind, ScenarioConfig};
use crate::{Error, Result};

/// Weight applied to each triggered rule's severity in the risk score.
pub const RULE_RISK_WEIGHT: f64 = 0.5;

/// Composite assessment of one completed execution. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    scenario_id: String,
    results: BTreeMap<ModelKind, ModelResult>,
    selected: BTreeSet<ModelKind>,
    effects: Vec<InteractionEffect>,
    triggered_rules: Vec<TriggeredRule>,
    adjusted_metrics: MetricTable,
    risk_score: f64,
    confidence: f64,
    degraded: bool,
    risk: RiskAssessment,
    timeline: Vec<TimelinePhase>,
    generated_at: DateTime<Utc>,
}

impl CompositeResult {
    /// Scenario this result belongs to.
    #[must_use]
    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    /// Every model result, successful or not, in identifier order.
    #[must_use]
    pub const fn results(&self) -> &BTreeMap<ModelKind, ModelResult> {
        &self.results
    }

    /// Models selected by the configuration.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<ModelKind> {
        &self.selected
    }

    /// Models that succeeded and took part in aggregation.
    #[must_use]
    pub fn participating(&self) -> BTreeSet<ModelKind> {
        self.adjusted_metrics.keys().copied().collect()
    }

    /// Applied interaction effects, in application order.
    #[must_use]
    pub fn effects(&self) -> &[InteractionEffect] {
        &self.effects
    }

    /// Rules that applied at least one effect.
    #[must_use]
    pub fn triggered_rules(&self) -> &[TriggeredRule] {
        &self.triggered_rules
    }

    /// Headline metrics after interaction effects.
    #[must_use]
    pub const fn adjusted_metrics(&self) -> &MetricTable {
        &self.adjusted_metrics
    }

    /// Adjusted metric of one model.
    #[must_use]
    pub fn metric(&self, model: ModelKind, field: &str) -> Option<f64> {
        self.adjusted_metrics.get(&model)?.get(field).copied()
    }

    /// Aggregate risk score in `[0, 1]`.
    #[must_use]
    pub const fn risk_score(&self) -> f64 {
        self.risk_score
    }

    /// Mean confidence of the participating models.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Whether some selected models did not succeed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Risk assessment.
    #[must_use]
    pub const fn risk(&self) -> &RiskAssessment {
        &self.risk
    }

    /// Phase projections.
    #[must_use]
    pub fn timeline(&self) -> &[TimelinePhase] {
        &self.timeline
    }

    /// Generation timestamp.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

/// Composite aggregator over an ordered interaction rule table.
#[derive(Debug, Clone)]
pub struct Aggregator {
    rules: Vec<InteractionRule>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Aggregator with the built-in rule table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Aggregator with a custom rule table, applied in the given order.
    #[must_use]
    pub const fn with_rules(rules: Vec<InteractionRule>) -> Self {
        Self { rules }
    }

    /// Rule table in application order.
    #[must_use]
    pub fn rules(&self) -> &[InteractionRule] {
        &self.rules
    }

    /// Aggregate the results of one execution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aggregation`] if no model succeeded.
    pub fn aggregate(
        &self,
        scenario_id: &str,
        config: &ScenarioConfig,
        results: Vec<ModelResult>,
        generated_at: DateTime<Utc>,
    ) -> Result<CompositeResult> {
        let results: BTreeMap<ModelKind, ModelResult> =
            results.into_iter().map(|r| (r.model(), r)).collect();

        let mut metrics = MetricTable::new();
        let mut severities = BTreeMap::new();
        let mut confidences = Vec::new();
        for (kind, result) in results.iter().filter(|(_, r)| r.is_success()) {
            metrics.insert(*kind, numeric_fields(result));
            severities.insert(*kind, result.severity());
            confidences.push(result.confidence());
        }

        if metrics.is_empty() {
            return Err(Error::Aggregation(format!(
                "no model succeeded for scenario {scenario_id} ({} selected)",
                config.models.len()
            )));
        }

        let (triggered_rules, effects) = apply_rules(&self.rules, config, &mut metrics);

        let mean_severity = mean(severities.values().copied());
        let rule_factor: f64 = triggered_rules
            .iter()
            .map(|r| 1.0 - r.severity * RULE_RISK_WEIGHT)
            .product();
        let risk_score = (1.0 - (1.0 - mean_severity) * rule_factor).clamp(0.0, 1.0);
        let confidence = mean(confidences.into_iter());

        let degraded = config.models.iter().any(|m| !metrics.contains_key(m));
        let risk = RiskAssessment::assess(&severities, &effects, &triggered_rules, risk_score);
        let timeline = timeline::project(config.duration_days, &metrics);

        debug!(
            scenario_id,
            participating = metrics.len(),
            rules = triggered_rules.len(),
            risk_score,
            degraded,
            "aggregation complete"
        );

        Ok(CompositeResult {
            scenario_id: scenario_id.to_string(),
            results,
            selected: config.models.clone(),
            effects,
            triggered_rules,
            adjusted_metrics: metrics,
            risk_score,
            confidence,
            degraded,
            risk,
            timeline,
            generated_at,
        })
    }
}

fn numeric_fields(result: &ModelResult) -> BTreeMap<String, f64> {
    result
        .payload()
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(k, v)| v.as_f64().map(|v| (k.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelReport;
    use crate::scenario::EnvironmentType;
    use chrono::TimeZone;
    use std::time::Duration;

    fn success(kind: ModelKind, payload: serde_json::Value, severity: f64) -> ModelResult {
        ModelResult::success(
            kind,
            ModelReport {
                payload,
                confidence: 0.8,
                severity,
                memory_mb: 16.0,
            },
            Duration::from_millis(5),
        )
    }

    fn military() -> ModelResult {
        success(
            ModelKind::Military,
            serde_json::json!({"casualties": 2_000.0, "escalation_index": 0.4}),
            0.5,
        )
    }

    fn economic() -> ModelResult {
        success(
            ModelKind::Economic,
            serde_json::json!({"damage_usd": 1.0e9, "gdp_impact_percent": 2.0}),
            0.3,
        )
    }

    fn config() -> ScenarioConfig {
        ScenarioConfig::new(EnvironmentType::MediumCity, 100_000)
            .models([ModelKind::Military, ModelKind::Economic])
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_zero_successes_is_error() {
        let results = vec![
            ModelResult::failed(ModelKind::Military, "boom", Duration::ZERO),
            ModelResult::timed_out(ModelKind::Economic, Duration::from_secs(1)),
        ];
        let err = Aggregator::new()
            .aggregate("scn", &config(), results, at())
            .unwrap_err();
        assert!(matches!(err, Error::Aggregation(_)));
    }

    #[test]
    fn test_degraded_when_subset_succeeds() {
        let results = vec![
            military(),
            ModelResult::failed(ModelKind::Economic, "boom", Duration::ZERO),
        ];
        let composite = Aggregator::new()
            .aggregate("scn", &config(), results, at())
            .unwrap();
        assert!(composite.is_degraded());
        assert_eq!(composite.participating().len(), 1);
        assert_eq!(composite.results().len(), 2);
        assert!(composite.effects().is_empty());
    }

    #[test]
    fn test_not_degraded_when_all_succeed() {
        let composite = Aggregator::new()
            .aggregate("scn", &config(), vec![military(), economic()], at())
            .unwrap();
        assert!(!composite.is_degraded());
        assert!((composite.confidence() - 0.8).abs() < 1e-12);
        assert_eq!(composite.triggered_rules()[0].name, "military_economic");
        assert!(composite.metric(ModelKind::Economic, "damage_usd").unwrap() > 1.0e9);
    }

    #[test]
    fn test_nuclear_escalation_raises_damage_and_risk() {
        let aggregator = Aggregator::new();
        let base = aggregator
            .aggregate("a", &config(), vec![military(), economic()], at())
            .unwrap();
        let nuclear = aggregator
            .aggregate(
                "b",
                &config().nuclear_escalation(true),
                vec![military(), economic()],
                at(),
            )
            .unwrap();
        let damage = |c: &CompositeResult| c.metric(ModelKind::Economic, "damage_usd").unwrap();
        assert!(damage(&nuclear) > damage(&base));
        assert!(nuclear.risk_score() > base.risk_score());
    }

    #[test]
    fn test_risk_score_formula() {
        let composite = Aggregator::with_rules(Vec::new())
            .aggregate("scn", &config(), vec![military(), economic()], at())
            .unwrap();
        assert!((composite.risk_score() - 0.4).abs() < 1e-12);
        assert!(composite.triggered_rules().is_empty());
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let aggregator = Aggregator::new();
        let config = config().nuclear_escalation(true);
        let a = aggregator
            .aggregate("scn", &config, vec![economic(), military()], at())
            .unwrap();
        let b = aggregator
            .aggregate("scn", &config, vec![military(), economic()], at())
            .unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_composite_round_trips_through_json() {
        let composite = Aggregator::new()
            .aggregate("scn", &config(), vec![military(), economic()], at())
            .unwrap();
        let json = serde_json::to_string(&composite).unwrap();
        let back: CompositeResult = serde_json::from_str(&json).unwrap();
        assert!((back.risk_score() - composite.risk_score()).abs() < 1e-12);
        assert_eq!(back.effects().len(), composite.effects().len());
        assert_eq!(back.generated_at(), at());
    }
}
