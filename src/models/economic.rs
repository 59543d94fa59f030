//! Economic impact model

use std::time::Duration;

use serde_json::json;

use super::{mean_gdp_per_capita, DomainModel, ModelContext, ModelDescriptor, ModelError, ModelReport};
use crate::scenario::ModelKind;

/// Share of daily output lost at full intensity on the first day.
const BASE_DAILY_LOSS: f64 = 0.3;
/// Sectoral cascade added on top of direct losses.
const CASCADE_SHARE: f64 = 0.15;

/// Economic impact assessment: output loss, cascades and recovery horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct EconomicModel;

impl DomainModel for EconomicModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Economic
    }

    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("Economic Impact Assessment")
            .runtime(Duration::from_secs(20), Duration::from_secs(45))
            .memory_mb(192)
    }

    fn run(&self, ctx: &ModelContext<'_>) -> Result<ModelReport, ModelError> {
        let intensity = ctx.config.intensity.factor();
        let local_gdp = ctx.population() * mean_gdp_per_capita(ctx.countries);
        let daily_output = local_gdp / 365.0;

        let mut direct = 0.0_f64;
        for day in 0..ctx.config.duration_days {
            ctx.checkpoint()?;
            // Recession deepens for the first month, then plateaus.
            let deepening = (1.0 + f64::from(day) / 30.0).min(3.0);
            let loss_share = (BASE_DAILY_LOSS * intensity * deepening).min(0.95);
            direct += daily_output * loss_share;
        }
        let cascade = direct * CASCADE_SHARE;
        let damage_usd = direct + cascade;
        let gdp_impact_percent = if local_gdp > 0.0 {
            damage_usd / local_gdp * 100.0
        } else {
            0.0
        };
        let severity = (gdp_impact_percent / 20.0).clamp(0.0, 1.0);

        Ok(ModelReport {
            payload: json!({
                "damage_usd": damage_usd,
                "direct_damage_usd": direct,
                "cascade_usd": cascade,
                "gdp_impact_percent": gdp_impact_percent,
                "local_gdp_usd": local_gdp,
                "recovery_months": (gdp_impact_percent * 2.0).ceil(),
            }),
            confidence: 0.7,
            severity,
            memory_mb: 32.0 + f64::from(ctx.config.duration_days) * 0.1,
        })
    }
}
