//! Population and social impact model

use std::time::Duration;

use serde_json::json;

use super::{DomainModel, ModelContext, ModelDescriptor, ModelError, ModelReport};
use crate::scenario::ModelKind;

/// Daily displacement hazard at full intensity.
const DISPLACEMENT_HAZARD: f64 = 0.004;
/// Displacement saturates at this share of the population.
const MAX_DISPLACED_SHARE: f64 = 0.6;

/// Population displacement and social unrest.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocialModel;

impl DomainModel for SocialModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Social
    }

    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("Population Impact Analysis")
            .runtime(Duration::from_secs(15), Duration::from_secs(40))
            .memory_mb(128)
    }

    fn run(&self, ctx: &ModelContext<'_>) -> Result<ModelReport, ModelError> {
        let intensity = ctx.config.intensity.factor();
        let population = ctx.population();
        let ceiling = population * MAX_DISPLACED_SHARE;

        let mut displaced = 0.0_f64;
        for _ in 0..ctx.config.duration_days {
            ctx.checkpoint()?;
            let remaining = (ceiling - displaced).max(0.0);
            displaced += remaining * DISPLACEMENT_HAZARD * intensity;
        }
        displaced = displaced.round();

        let displacement_rate_percent = if population > 0.0 {
            displaced / population * 100.0
        } else {
            0.0
        };
        let unrest_probability = intensity
            .mul_add(0.4, displacement_rate_percent / 100.0)
            .min(0.8);
        let severity = (displacement_rate_percent / 50.0 + unrest_probability * 0.3).clamp(0.0, 1.0);

        Ok(ModelReport {
            payload: json!({
                "displaced": displaced,
                "displacement_rate_percent": displacement_rate_percent,
                "unrest_probability": unrest_probability,
                "population": population,
            }),
            confidence: 0.8,
            severity,
            memory_mb: 24.0 + population / 1e6,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{city, field, run_model};
    use super::*;
    use crate::scenario::Intensity;

    #[test]
    fn test_displacement_saturates() {
        let report = run_model(&SocialModel, &city(Intensity::Extreme).duration_days(5_000));
        assert!(field(&report, "displaced") <= 100_000.0 * MAX_DISPLACED_SHARE);
        assert!(field(&report, "unrest_probability") <= 0.8);
    }

    #[test]
    fn test_displacement_grows_with_intensity() {
        let low = run_model(&SocialModel, &city(Intensity::Low));
        let high = run_model(&SocialModel, &city(Intensity::High));
        assert!(field(&high, "displaced") > field(&low, "displaced"));
    }
}
