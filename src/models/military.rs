//! Military conflict model

use std::time::Duration;

use serde_json::json;

use super::{DomainModel, ModelContext, ModelDescriptor, ModelError, ModelReport};
use crate::scenario::ModelKind;

/// Share of the population exposed to direct combat per day at full intensity.
const DAILY_EXPOSURE: f64 = 0.000_4;

/// Military conflict analysis: casualties and escalation pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilitaryModel;

impl DomainModel for MilitaryModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Military
    }

    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("Military Conflict Analysis")
            .runtime(Duration::from_secs(30), Duration::from_secs(60))
            .memory_mb(256)
    }

    fn run(&self, ctx: &ModelContext<'_>) -> Result<ModelReport, ModelError> {
        let intensity = ctx.config.intensity.factor();
        let days = f64::from(ctx.config.duration_days);
        let force_projection = ctx
            .countries
            .iter()
            .map(|c| c.military_strength())
            .fold(5.0_f64, f64::max)
            / 10.0;

        let mut casualties = 0.0_f64;
        let mut peak = 0.0_f64;
        let decay_window = days.mul_add(0.6, 1.0);
        for day in 0..ctx.config.duration_days {
            ctx.checkpoint()?;
            let remaining = ctx.population() - casualties;
            let tempo = (-f64::from(day) / decay_window).exp();
            let daily = remaining * DAILY_EXPOSURE * intensity * force_projection * tempo;
            casualties += daily;
            peak = peak.max(daily);
        }
        casualties = casualties.round();

        let nuclear = if ctx.config.nuclear_escalation { 0.3 } else { 0.0 };
        let escalation_index = (intensity * 0.6 + days / 365.0 * 0.2 + nuclear).min(1.0);
        let casualty_rate = casualties / ctx.population().max(1.0);
        let severity = casualty_rate
            .mul_add(50.0, escalation_index * 0.5)
            .clamp(0.0, 1.0);
        let confidence = if ctx.config.duration_days <= 90 { 0.9 } else { 0.8 };

        Ok(ModelReport {
            payload: json!({
                "casualties": casualties,
                "daily_casualty_peak": peak.round(),
                "escalation_index": escalation_index,
                "force_projection": force_projection,
                "severity": severity,
            }),
            confidence,
            severity,
            memory_mb: 48.0 + days * 0.25,
        })
    }
}
