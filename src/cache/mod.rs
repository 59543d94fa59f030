//! Result cache
//!
//! Time-bounded store of visualization-ready payloads keyed by
//! `(scenario id, artifact)`. A put overwrites; an expired entry is removed
//! by the read that finds it, or by [`ResultCache::purge_expired`]. There is
//! no size bound and no LRU eviction.
//!
//! Expiry uses `tokio::time::Instant`, so tests can drive it with a paused
//! clock.

use std::fmt;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::scenario::ModelKind;

/// Cached artifact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Full composite result
    Composite,
    /// Risk assessment only
    RiskSummary,
    /// Timeline projections
    Timeline,
    /// Raw payload of one model
    ModelPayload(ModelKind),
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite => f.write_str("composite"),
            Self::RiskSummary => f.write_str("risk_summary"),
            Self::Timeline => f.write_str("timeline"),
            Self::ModelPayload(model) => write!(f, "model_payload:{model}"),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: serde_json::Value,
    /// `None` when the TTL reaches past the clock's range.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Concurrent TTL cache of artifact payloads.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<(String, ArtifactKind), CacheEntry>,
}

impl ResultCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload, replacing any previous entry for the key. A TTL too
    /// large for the clock never expires.
    pub fn put(
        &self,
        scenario_id: &str,
        artifact: ArtifactKind,
        payload: serde_json::Value,
        ttl: Duration,
    ) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.insert(
            (scenario_id.to_string(), artifact),
            CacheEntry {
                payload,
                expires_at,
            },
        );
    }

    /// Read a payload. An expired entry is removed and reported as a miss.
    #[must_use]
    pub fn get(&self, scenario_id: &str, artifact: ArtifactKind) -> Option<serde_json::Value> {
        let key = (scenario_id.to_string(), artifact);
        let now = Instant::now();
        {
            let entry = self.entries.get(&key)?;
            if !entry.is_expired(now) {
                return Some(entry.payload.clone());
            }
        }
        // Re-check under the write lock: a concurrent put may have refreshed it.
        self.entries.remove_if(&key, |_, entry| entry.is_expired(now));
        None
    }

    /// Remove every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Remove every artifact of a scenario.
    pub fn invalidate(&self, scenario_id: &str) {
        self.entries.retain(|(id, _), _| id != scenario_id);
    }

    /// Number of entries, expired ones included until purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
