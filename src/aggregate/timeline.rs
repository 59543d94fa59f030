//! Timeline projections
//!
//! Spreads the adjusted headline totals over four phases of the scenario.
//! Shares per metric sum to one, so the cumulative value of the last phase
//! equals the total.

use serde::{Deserialize, Serialize};

use super::rules::MetricTable;
use crate::scenario::ModelKind;

/// Phase name, end of phase as a fraction of duration, and the shares of
/// casualties, economic damage and displacement realised in it.
const PHASES: [(&str, f64, [f64; 3]); 4] = [
    ("immediate", 0.1, [0.6, 0.4, 0.5]),
    ("short_term", 0.3, [0.25, 0.3, 0.3]),
    ("medium_term", 0.7, [0.1, 0.2, 0.15]),
    ("long_term", 1.0, [0.05, 0.1, 0.05]),
];

/// One projected phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePhase {
    /// Phase name
    pub phase: String,
    /// First day (inclusive)
    pub start_day: u32,
    /// Last day (exclusive)
    pub end_day: u32,
    /// Casualties realised in this phase
    pub casualties: Option<f64>,
    /// Economic damage (USD) realised in this phase
    pub damage_usd: Option<f64>,
    /// People displaced in this phase
    pub displaced: Option<f64>,
    /// Cumulative economic damage at the end of this phase
    pub cumulative_damage_usd: Option<f64>,
}

/// Project adjusted totals over the scenario duration. Metrics from models
/// that did not succeed stay `None`.
#[must_use]
pub fn project(duration_days: u32, metrics: &MetricTable) -> Vec<TimelinePhase> {
    let total = |kind: ModelKind, field: &str| metrics.get(&kind).and_then(|m| m.get(field)).copied();
    let casualties = total(ModelKind::Military, "casualties");
    let damage = total(ModelKind::Economic, "damage_usd");
    let displaced = total(ModelKind::Social, "displaced");

    let mut start_day = 0;
    let mut cumulative = 0.0;
    PHASES
        .iter()
        .map(|(name, end_fraction, [c_share, d_share, p_share])| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let end_day = ((f64::from(duration_days) * end_fraction).ceil() as u32)
                .clamp(start_day, duration_days);
            cumulative += damage.map_or(0.0, |d| d * d_share);
            let phase = TimelinePhase {
                phase: (*name).to_string(),
                start_day,
                end_day,
                casualties: casualties.map(|c| c * c_share),
                damage_usd: damage.map(|d| d * d_share),
                displaced: displaced.map(|p| p * p_share),
                cumulative_damage_usd: damage.map(|_| cumulative),
            };
            start_day = end_day;
            phase
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_phase_shares_sum_to_one() {
        for index in 0..3 {
            let sum: f64 = PHASES.iter().map(|(_, _, shares)| shares[index]).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_phases_cover_duration() {
        let timeline = project(45, &MetricTable::new());
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline[0].start_day, 0);
        assert_eq!(timeline[3].end_day, 45);
        for pair in timeline.windows(2) {
            assert_eq!(pair[0].end_day, pair[1].start_day);
        }
        assert!(timeline.iter().all(|p| p.damage_usd.is_none()));
    }

    #[test]
    fn test_cumulative_damage_reaches_total() {
        let metrics = MetricTable::from([(
            ModelKind::Economic,
            BTreeMap::from([("damage_usd".to_string(), 1_000.0)]),
        )]);
        let timeline = project(1, &metrics);
        let last = timeline.last().unwrap();
        assert!((last.cumulative_damage_usd.unwrap() - 1_000.0).abs() < 1e-9);
        assert!(timeline[0].casualties.is_none());
    }
}
