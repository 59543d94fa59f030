//! Infrastructure and environmental model

use std::time::Duration;

use serde_json::json;

use super::{DomainModel, ModelContext, ModelDescriptor, ModelError, ModelReport};
use crate::scenario::{EnvironmentType, ModelKind};

/// Daily probability of a service failing at full intensity.
const DAILY_FAILURE: f64 = 0.01;
/// Disruption never exceeds this share of services.
const MAX_DISRUPTION: f64 = 0.95;

/// Critical infrastructure disruption and recovery horizon.
///
/// Not applicable at global scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfrastructureModel;

impl DomainModel for InfrastructureModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Infrastructure
    }

    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("Infrastructure Analysis")
            .environments(
                EnvironmentType::ALL
                    .into_iter()
                    .filter(|env| *env != EnvironmentType::Global),
            )
            .runtime(Duration::from_secs(25), Duration::from_secs(50))
            .memory_mb(160)
    }

    fn run(&self, ctx: &ModelContext<'_>) -> Result<ModelReport, ModelError> {
        let intensity = ctx.config.intensity.factor();

        let mut operational = 1.0_f64;
        for _ in 0..ctx.config.duration_days {
            ctx.checkpoint()?;
            operational *= DAILY_FAILURE.mul_add(-intensity, 1.0);
        }
        let service_disruption = (1.0 - operational).min(MAX_DISRUPTION);
        let recovery_days =
            (f64::from(ctx.config.duration_days) * intensity.mul_add(3.0, 1.0)).ceil();

        Ok(ModelReport {
            payload: json!({
                "service_disruption": service_disruption,
                "recovery_days": recovery_days,
                "operational_share": 1.0 - service_disruption,
            }),
            confidence: 0.6,
            severity: service_disruption,
            memory_mb: 40.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{city, field, run_model};
    use super::*;
    use crate::scenario::Intensity;

    #[test]
    fn test_not_applicable_globally() {
        let descriptor = InfrastructureModel.descriptor();
        assert!(!descriptor.supports(EnvironmentType::Global));
        assert!(descriptor.supports(EnvironmentType::Village));
    }

    #[test]
    fn test_disruption_capped() {
        let report = run_model(
            &InfrastructureModel,
            &city(Intensity::Extreme).duration_days(2_000),
        );
        assert!(field(&report, "service_disruption") <= MAX_DISRUPTION);
        assert!((report.severity - MAX_DISRUPTION).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recovery_scales_with_intensity() {
        let low = run_model(&InfrastructureModel, &city(Intensity::Low));
        let high = run_model(&InfrastructureModel, &city(Intensity::High));
        assert!(field(&high, "recovery_days") > field(&low, "recovery_days"));
    }
}
