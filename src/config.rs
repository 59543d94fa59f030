//! Engine configuration
//!
//! Values come from defaults, an optional JSON document and `SCENARIO_*`
//! environment variables, applied in that order.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::{Error, Result};

/// Default bound on simultaneously running models.
pub const DEFAULT_MAX_CONCURRENT_MODELS: usize = 5;
/// Default global execution timeout (5 minutes).
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 300_000;
/// Default artifact time-to-live.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_max_concurrent_models() -> usize {
    DEFAULT_MAX_CONCURRENT_MODELS
}

fn default_execution_timeout_ms() -> u64 {
    DEFAULT_EXECUTION_TIMEOUT_MS
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bound on models running at once across all executions
    #[serde(default = "default_max_concurrent_models")]
    pub max_concurrent_models: usize,
    /// Global deadline per execution, measured from dispatch
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,
    /// Optional deadline per model invocation
    #[serde(default)]
    pub model_timeout_ms: Option<u64>,
    /// Time-to-live of cached artifacts
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_models: DEFAULT_MAX_CONCURRENT_MODELS,
            execution_timeout_ms: DEFAULT_EXECUTION_TIMEOUT_MS,
            model_timeout_ms: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Start a builder from the defaults.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::Validation`] for rejected values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SCENARIO_*` environment variables on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a variable does not parse or the
    /// result is invalid.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a value does not parse or the result
    /// is invalid.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("SCENARIO_MAX_CONCURRENT_MODELS") {
            self.max_concurrent_models = parse_var("SCENARIO_MAX_CONCURRENT_MODELS", &v)?;
        }
        if let Some(v) = lookup("SCENARIO_EXECUTION_TIMEOUT_MS") {
            self.execution_timeout_ms = parse_var("SCENARIO_EXECUTION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SCENARIO_MODEL_TIMEOUT_MS") {
            self.model_timeout_ms = Some(parse_var("SCENARIO_MODEL_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("SCENARIO_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_var("SCENARIO_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("SCENARIO_LOG_LEVEL") {
            self.log_level = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for zero concurrency, a zero timeout or
    /// TTL, or a duration the clock cannot add to the current instant.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_models == 0 {
            return Err(Error::Validation(
                "max_concurrent_models must be at least 1".to_string(),
            ));
        }
        if self.execution_timeout_ms == 0 {
            return Err(Error::Validation(
                "execution_timeout_ms must be positive".to_string(),
            ));
        }
        if self.model_timeout_ms == Some(0) {
            return Err(Error::Validation(
                "model_timeout_ms must be positive when set".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(Error::Validation("cache_ttl_secs must be positive".to_string()));
        }
        ensure_representable("execution_timeout_ms", self.execution_timeout())?;
        if let Some(timeout) = self.model_timeout() {
            ensure_representable("model_timeout_ms", timeout)?;
        }
        ensure_representable("cache_ttl_secs", self.cache_ttl())
    }

    /// Global execution timeout.
    #[must_use]
    pub const fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }

    /// Per-model timeout, if configured.
    #[must_use]
    pub fn model_timeout(&self) -> Option<Duration> {
        self.model_timeout_ms.map(Duration::from_millis)
    }

    /// Artifact time-to-live.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn ensure_representable(key: &str, duration: Duration) -> Result<()> {
    if Instant::now().checked_add(duration).is_none() {
        return Err(Error::Validation(format!(
            "{key} is too large: {}s cannot be added to the clock",
            duration.as_secs()
        )));
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("{key}={value} is not a valid number")))
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the concurrency bound.
    #[must_use]
    pub const fn max_concurrent_models(mut self, max: usize) -> Self {
        self.config.max_concurrent_models = max;
        self
    }

    /// Set the global execution timeout.
    #[must_use]
    pub fn execution_timeout(mut self, timeout: Duration) -> Self {
        self.config.execution_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the per-model timeout.
    #[must_use]
    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.config.model_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Set the artifact time-to-live.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Set the default log filter.
    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for rejected values.
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_concurrent_models, 5);
        assert_eq!(config.execution_timeout(), Duration::from_secs(300));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.model_timeout().is_none());
        assert_eq!(config.log_level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_concurrent_models": 2}"#).unwrap();
        assert_eq!(config.max_concurrent_models, 2);
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn test_from_json_rejects_zero() {
        let err = EngineConfig::from_json_str(r#"{"execution_timeout_ms": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_rejects_unrepresentable_durations() {
        let err = EngineConfig::from_json_str(r#"{"cache_ttl_secs": 18446744073709551615}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("cache_ttl_secs"));

        let config = EngineConfig {
            cache_ttl_secs: 86_400 * 365,
            ..EngineConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("SCENARIO_MAX_CONCURRENT_MODELS", "8"),
            ("SCENARIO_MODEL_TIMEOUT_MS", "1500"),
            ("SCENARIO_LOG_LEVEL", "debug"),
        ]);
        let config = EngineConfig::default()
            .with_overrides_from(|k| vars.get(k).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.max_concurrent_models, 8);
        assert_eq!(config.model_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.execution_timeout_ms, DEFAULT_EXECUTION_TIMEOUT_MS);
    }

    #[test]
    fn test_override_parse_error() {
        let err = EngineConfig::default()
            .with_overrides_from(|k| (k == "SCENARIO_CACHE_TTL_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SCENARIO_CACHE_TTL_SECS"));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::builder()
            .max_concurrent_models(1)
            .execution_timeout(Duration::from_millis(250))
            .model_timeout(Duration::from_millis(100))
            .cache_ttl(Duration::from_secs(60))
            .log_level("warn")
            .build()
            .unwrap();
        assert_eq!(config.execution_timeout_ms, 250);
        assert_eq!(config.model_timeout_ms, Some(100));
        assert_eq!(config.cache_ttl_secs, 60);

        assert!(EngineConfig::builder().max_concurrent_models(0).build().is_err());
    }
}
