use serde::Serialize;

use crossbreed_cache::CacheStats;
use crossbreed_observability::MetricsSnapshot;

/// Snapshot returned by `CrossEngine::stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub metrics: MetricsSnapshot,
    pub cache: CacheStats,
    /// Keys with a backend computation running right now.
    pub in_flight: usize,
    /// Memoized parent genetics records (0 when memoization is disabled).
    pub memoized_parents: u64,
    pub model_version: String,
}

impl EngineStats {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
