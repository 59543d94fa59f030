//! Risk assessment derived from the adjusted model severities

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::rules::{InteractionEffect, TriggeredRule};
use crate::scenario::ModelKind;

/// Domains above this score are reported as critical.
pub const CRITICAL_DOMAIN_THRESHOLD: f64 = 0.7;

/// Coarse risk band of an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Score below 0.4
    Low,
    /// Score in `[0.4, 0.6)`
    Moderate,
    /// Score in `[0.6, 0.8)`
    High,
    /// Score of 0.8 or more
    Critical,
}

impl RiskLevel {
    /// Band for a score in `[0, 1]`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Critical
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// Policy recommendations grouped by horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Actions for the first hours and days
    pub immediate_actions: Vec<String>,
    /// Strategies for the coming weeks
    pub short_term_strategies: Vec<String>,
    /// Structural policies
    pub long_term_policies: Vec<String>,
    /// Coordination with other states and organizations
    pub international_coordination: Vec<String>,
}

/// Risk assessment attached to every composite result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Overall risk score in `[0, 1]`
    pub overall: f64,
    /// Band of the overall score
    pub level: RiskLevel,
    /// Per-domain risk after interaction effects
    pub categories: BTreeMap<ModelKind, f64>,
    /// Domains above [`CRITICAL_DOMAIN_THRESHOLD`]
    pub critical_domains: Vec<ModelKind>,
    /// Mitigation priorities, most severe first
    pub priorities: Vec<String>,
    /// Share of a mitigation budget per domain, proportional to its risk
    pub allocation: BTreeMap<ModelKind, f64>,
    /// Policy recommendations
    pub recommendations: Recommendations,
}

impl RiskAssessment {
    /// Assess risk from each successful model's own severity, the effects
    /// applied to it, and the overall score.
    ///
    /// Multiplicative effects scale a domain's severity. An increase from a
    /// zero base has no multiplier; it lifts the domain to at least the
    /// severity of the rule that caused it.
    #[must_use]
    pub fn assess(
        severities: &BTreeMap<ModelKind, f64>,
        effects: &[InteractionEffect],
        triggered: &[TriggeredRule],
        overall: f64,
    ) -> Self {
        let rule_severity = |name: &str| {
            triggered
                .iter()
                .find(|r| r.name == name)
                .map_or(0.0, |r| r.severity)
        };
        let categories: BTreeMap<ModelKind, f64> = severities
            .iter()
            .map(|(kind, severity)| {
                let targeting = effects.iter().filter(|e| e.target == *kind);
                let amplification: f64 = targeting.clone().filter_map(|e| e.factor).product();
                let floor = targeting
                    .filter(|e| e.factor.is_none() && e.delta > 0.0)
                    .map(|e| rule_severity(&e.rule))
                    .fold(0.0, f64::max);
                (*kind, (severity * amplification).max(floor).clamp(0.0, 1.0))
            })
            .collect();

        let critical_domains: Vec<ModelKind> = categories
            .iter()
            .filter(|(_, score)| **score > CRITICAL_DOMAIN_THRESHOLD)
            .map(|(kind, _)| *kind)
            .collect();

        let level = RiskLevel::from_score(overall);
        Self {
            overall,
            level,
            priorities: priorities(&categories),
            allocation: allocation(&categories),
            recommendations: recommendations(level, &critical_domains),
            categories,
            critical_domains,
        }
    }
}

fn priorities(categories: &BTreeMap<ModelKind, f64>) -> Vec<String> {
    let mut ranked: Vec<(ModelKind, f64)> = categories.iter().map(|(k, v)| (*k, *v)).collect();
    // Stable sort keeps identifier order among equal scores.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .filter_map(|(kind, score)| {
            if score > 0.7 {
                Some(format!("critical: address {kind} risk (score {score:.2})"))
            } else if score > 0.5 {
                Some(format!("high: mitigate {kind} risk (score {score:.2})"))
            } else if score > 0.3 {
                Some(format!("medium: monitor {kind} risk (score {score:.2})"))
            } else {
                None
            }
        })
        .collect()
}

fn allocation(categories: &BTreeMap<ModelKind, f64>) -> BTreeMap<ModelKind, f64> {
    let total: f64 = categories.values().sum();
    if total <= f64::EPSILON {
        return BTreeMap::new();
    }
    categories
        .iter()
        .map(|(kind, score)| (*kind, score / total))
        .collect()
}

fn recommendations(level: RiskLevel, critical: &[ModelKind]) -> Recommendations {
    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    let mut out = Recommendations {
        long_term_policies: owned(&[
            "Develop comprehensive national resilience strategy",
            "Invest in critical infrastructure hardening",
            "Establish international cooperation frameworks",
            "Create adaptive governance mechanisms",
        ]),
        ..Recommendations::default()
    };

    match level {
        RiskLevel::Critical => out.immediate_actions = owned(&[
            "Activate emergency response protocols",
            "Establish crisis command center",
            "Initiate evacuation procedures for high-risk areas",
            "Deploy emergency medical resources",
        ]),
        RiskLevel::High => out.immediate_actions = owned(&[
            "Heighten alert status for relevant agencies",
            "Pre-position emergency resources",
            "Increase intelligence gathering",
        ]),
        RiskLevel::Moderate | RiskLevel::Low => {}
    }

    for domain in critical {
        let (immediate, short_term) = match domain {
            ModelKind::Military => ("Activate missile defense systems", "Strengthen defense capabilities"),
            ModelKind::Economic => ("Implement economic stabilization measures", "Diversify supply chains"),
            ModelKind::Social => ("Enhance social support systems", "Strengthen community resilience programs"),
            ModelKind::Infrastructure => (
                "Deploy emergency repair crews to critical services",
                "Build redundancy into utility networks",
            ),
        };
        out.immediate_actions.push(immediate.to_string());
        out.short_term_strategies.push(short_term.to_string());
    }

    if level >= RiskLevel::High {
        out.international_coordination = owned(&[
            "Engage multilateral organizations",
            "Coordinate with regional allies",
            "Establish information sharing protocols",
            "Develop joint response capabilities",
        ]);
    }
    out
}
