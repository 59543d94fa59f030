//! Property-based tests for the scenario engine
//!
//! - Aggregation invariants (determinism, degradation, risk bounds)
//! - Execution record invariants (monotonic progress, frozen terminal states)
//! - Run with ProptestConfig::with_cases(100)

use std::time::Duration;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use scenario_engine::execution::ScenarioExecution;
use scenario_engine::models::ModelReport;
use scenario_engine::{
    Aggregator, EnvironmentType, Error, ExecutionStatus, ModelKind, ModelResult, RiskLevel,
    ScenarioConfig,
};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

fn arb_model() -> impl Strategy<Value = ModelKind> {
    prop_oneof![
        Just(ModelKind::Military),
        Just(ModelKind::Economic),
        Just(ModelKind::Social),
        Just(ModelKind::Infrastructure),
    ]
}

/// Headline payload for a model with plausible magnitudes.
fn payload(model: ModelKind, scale: f64) -> serde_json::Value {
    match model {
        ModelKind::Military => serde_json::json!({
            "casualties": 50_000.0 * scale,
            "escalation_index": scale,
        }),
        ModelKind::Economic => serde_json::json!({
            "damage_usd": 1.0e10 * scale,
            "gdp_impact_percent": 20.0 * scale,
        }),
        ModelKind::Social => serde_json::json!({
            "displaced": 40_000.0 * scale,
            "unrest_probability": 0.8 * scale,
        }),
        ModelKind::Infrastructure => serde_json::json!({
            "service_disruption": 0.9 * scale,
            "recovery_days": 180.0 * scale,
        }),
    }
}

/// One outcome per model: `Some((scale, severity, confidence))` succeeds.
fn arb_outcomes() -> impl Strategy<Value = Vec<(ModelKind, Option<(f64, f64, f64)>)>> {
    proptest::collection::btree_map(
        arb_model(),
        proptest::option::weighted(0.8, (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0)),
        1..=4,
    )
    .prop_map(|m| m.into_iter().collect())
}

fn arb_flags() -> impl Strategy<Value = (bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>())
}

fn build(
    outcomes: &[(ModelKind, Option<(f64, f64, f64)>)],
    (nuclear, supply, climate): (bool, bool, bool),
) -> (ScenarioConfig, Vec<ModelResult>) {
    let config = ScenarioConfig::new(EnvironmentType::LargeCity, 500_000)
        .models(outcomes.iter().map(|(m, _)| *m))
        .nuclear_escalation(nuclear)
        .supply_chain_impact(supply)
        .climate_effects(climate);
    let results = outcomes
        .iter()
        .map(|(model, outcome)| match outcome {
            Some((scale, severity, confidence)) => ModelResult::success(
                *model,
                ModelReport {
                    payload: payload(*model, *scale),
                    confidence: *confidence,
                    severity: *severity,
                    memory_mb: 32.0,
                },
                Duration::from_millis(3),
            ),
            None => ModelResult::failed(*model, "synthetic", Duration::from_millis(1)),
        })
        .collect();
    (config, results)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Aggregation Properties
    // ========================================================================

    /// Property: identical inputs serialize to identical JSON
    #[test]
    fn prop_aggregation_deterministic(outcomes in arb_outcomes(), flags in arb_flags()) {
        let (config, results) = build(&outcomes, flags);
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let aggregator = Aggregator::new();

        let mut reversed = results.clone();
        reversed.reverse();
        let a = aggregator.aggregate("scn", &config, results, at);
        let b = aggregator.aggregate("scn", &config, reversed, at);
        match (a, b) {
            (Ok(a), Ok(b)) => prop_assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            ),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "aggregation outcome depends on input order"),
        }
    }

    /// Property: degraded iff some selected model failed; error iff none succeeded
    #[test]
    fn prop_degradation_matches_outcomes(outcomes in arb_outcomes(), flags in arb_flags()) {
        let succeeded = outcomes.iter().filter(|(_, o)| o.is_some()).count();
        let (config, results) = build(&outcomes, flags);
        match Aggregator::new().aggregate("scn", &config, results, Utc::now()) {
            Ok(composite) => {
                prop_assert!(succeeded > 0);
                prop_assert_eq!(composite.is_degraded(), succeeded < outcomes.len());
                prop_assert_eq!(composite.participating().len(), succeeded);
            }
            Err(error) => {
                prop_assert_eq!(succeeded, 0);
                prop_assert!(matches!(error, Error::Aggregation(_)));
            }
        }
    }

    /// Property: risk and confidence stay in [0, 1] and the level matches the score
    #[test]
    fn prop_risk_bounded(outcomes in arb_outcomes(), flags in arb_flags()) {
        let (config, results) = build(&outcomes, flags);
        if let Ok(composite) = Aggregator::new().aggregate("scn", &config, results, Utc::now()) {
            prop_assert!((0.0..=1.0).contains(&composite.risk_score()));
            prop_assert!((0.0..=1.0).contains(&composite.confidence()));
            prop_assert_eq!(composite.risk().level, RiskLevel::from_score(composite.risk_score()));
            for score in composite.risk().categories.values() {
                prop_assert!((0.0..=1.0).contains(score));
            }
        }
    }

    /// Property: switching a modifier on never lowers the risk score
    #[test]
    fn prop_modifiers_never_lower_risk(outcomes in arb_outcomes()) {
        let aggregator = Aggregator::new();
        let (calm, results) = build(&outcomes, (false, false, false));
        let (stressed, _) = build(&outcomes, (true, true, true));
        let at = Utc::now();
        if let (Ok(a), Ok(b)) = (
            aggregator.aggregate("a", &calm, results.clone(), at),
            aggregator.aggregate("b", &stressed, results, at),
        ) {
            prop_assert!(b.risk_score() >= a.risk_score() - 1e-12);
        }
    }

    /// Property: capped metrics never exceed their bounds after interaction effects
    #[test]
    fn prop_capped_metrics_stay_capped(outcomes in arb_outcomes(), flags in arb_flags()) {
        let (config, results) = build(&outcomes, flags);
        if let Ok(composite) = Aggregator::new().aggregate("scn", &config, results, Utc::now()) {
            if let Some(unrest) = composite.metric(ModelKind::Social, "unrest_probability") {
                prop_assert!(unrest <= 1.0);
            }
            if let Some(disruption) = composite.metric(ModelKind::Infrastructure, "service_disruption") {
                prop_assert!(disruption <= 1.0);
            }
            if let Some(displaced) = composite.metric(ModelKind::Social, "displaced") {
                #[allow(clippy::cast_precision_loss)]
                let population = config.population as f64;
                prop_assert!(displaced <= population);
            }
        }
    }

    // ========================================================================
    // Execution Record Properties
    // ========================================================================

    /// Property: progress never decreases, whatever order updates arrive in
    #[test]
    fn prop_progress_monotonic(updates in proptest::collection::vec(0u8..=100, 1..50)) {
        let config = ScenarioConfig::new(EnvironmentType::Town, 10_000).model(ModelKind::Social);
        let mut execution = ScenarioExecution::new("scn", config);
        execution.start().unwrap();
        let mut last = execution.progress();
        for update in updates {
            execution.record_progress(update, "running").unwrap();
            prop_assert!(execution.progress() >= last);
            last = execution.progress();
        }
    }

    /// Property: a terminal record rejects every further transition
    #[test]
    fn prop_terminal_records_frozen(progress in 10u8..=80, fail in any::<bool>()) {
        let config = ScenarioConfig::new(EnvironmentType::Town, 10_000).model(ModelKind::Social);
        let mut execution = ScenarioExecution::new("scn", config);
        execution.start().unwrap();
        execution.record_progress(progress, "running").unwrap();
        if fail {
            execution.fail("boom").unwrap();
            prop_assert_eq!(execution.status(), ExecutionStatus::Error);
            prop_assert_eq!(execution.progress(), progress);
        } else {
            execution.begin_aggregation().unwrap();
            execution.fail("late failure").unwrap();
        }
        let frozen = execution.clone();
        prop_assert!(execution.record_progress(100, "again").is_err());
        prop_assert!(execution.begin_aggregation().is_err());
        prop_assert!(execution.fail("twice").is_err());
        prop_assert_eq!(execution, frozen);
    }
}
