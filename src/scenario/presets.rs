//! Built-in experiment presets

use super::{EnvironmentType, Intensity, ModelKind, ScenarioConfig};

/// Names of every built-in preset.
pub const PRESET_NAMES: [&str; 6] = [
    "india_pakistan_conflict",
    "china_taiwan_scenario",
    "middle_east_oil_crisis",
    "pandemic_economic_collapse",
    "cyber_warfare_escalation",
    "climate_refugee_crisis",
];

/// Look up a built-in preset by name.
#[must_use]
pub fn by_name(name: &str) -> Option<ScenarioConfig> {
    match name {
        "india_pakistan_conflict" => Some(india_pakistan_conflict()),
        "china_taiwan_scenario" => Some(china_taiwan_scenario()),
        "middle_east_oil_crisis" => Some(middle_east_oil_crisis()),
        "pandemic_economic_collapse" => Some(pandemic_economic_collapse()),
        "cyber_warfare_escalation" => Some(cyber_warfare_escalation()),
        "climate_refugee_crisis" => Some(climate_refugee_crisis()),
        _ => None,
    }
}

/// India-Pakistan conflict escalation over a contested region.
#[must_use]
pub fn india_pakistan_conflict() -> ScenarioConfig {
    ScenarioConfig::new(EnvironmentType::Region, 50_000_000)
        .name("India-Pakistan Conflict Escalation")
        .intensity(Intensity::High)
        .duration_days(45)
        .models(ModelKind::ALL)
        .nuclear_escalation(true)
}

/// China-Taiwan military scenario without nuclear escalation.
#[must_use]
pub fn china_taiwan_scenario() -> ScenarioConfig {
    ScenarioConfig::new(EnvironmentType::Nation, 23_500_000)
        .name("China-Taiwan Military Scenario")
        .intensity(Intensity::Extreme)
        .duration_days(60)
        .models(ModelKind::ALL)
}

/// Six month oil supply shock across the Gulf producers.
#[must_use]
pub fn middle_east_oil_crisis() -> ScenarioConfig {
    ScenarioConfig::new(EnvironmentType::Region, 60_000_000)
        .name("Middle East Oil Crisis")
        .intensity(Intensity::Extreme)
        .duration_days(180)
        .models([ModelKind::Economic, ModelKind::Social, ModelKind::Infrastructure])
        .supply_chain_impact(true)
}

/// Year-long pandemic with global supply chain collapse.
#[must_use]
pub fn pandemic_economic_collapse() -> ScenarioConfig {
    ScenarioConfig::new(EnvironmentType::Global, 7_800_000_000)
        .name("Pandemic Economic Collapse")
        .intensity(Intensity::High)
        .duration_days(365)
        .models([ModelKind::Economic, ModelKind::Social])
        .supply_chain_impact(true)
}

/// Cyber campaign against national infrastructure.
#[must_use]
pub fn cyber_warfare_escalation() -> ScenarioConfig {
    ScenarioConfig::new(EnvironmentType::Nation, 50_000_000)
        .name("Cyber Warfare Escalation")
        .intensity(Intensity::High)
        .duration_days(90)
        .models([ModelKind::Infrastructure, ModelKind::Economic, ModelKind::Social])
}

/// Thirty year climate displacement across South Asia.
#[must_use]
pub fn climate_refugee_crisis() -> ScenarioConfig {
    ScenarioConfig::new(EnvironmentType::Nation, 200_000_000)
        .name("Climate Refugee Crisis")
        .intensity(Intensity::Medium)
        .duration_days(10_950)
        .models([ModelKind::Social, ModelKind::Infrastructure, ModelKind::Economic])
        .climate_effects(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;

    #[test]
    fn test_every_preset_validates() {
        let registry = ModelRegistry::with_default_models();
        for name in PRESET_NAMES {
            let config = by_name(name).expect("preset exists");
            config.validate(&registry).expect("preset is valid");
        }
    }

    #[test]
    fn test_preset_ids_are_distinct() {
        let mut ids: Vec<String> = PRESET_NAMES
            .iter()
            .map(|name| by_name(name).unwrap().scenario_id().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), PRESET_NAMES.len());
    }

    #[test]
    fn test_preset_modifiers() {
        assert!(!china_taiwan_scenario().supply_chain_impact);
        assert!(middle_east_oil_crisis().supply_chain_impact);
        assert!(pandemic_economic_collapse().supply_chain_impact);
        assert!(climate_refugee_crisis().climate_effects);
        assert_eq!(climate_refugee_crisis().duration_days, 10_950);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(by_name("moon_landing").is_none());
    }
}
