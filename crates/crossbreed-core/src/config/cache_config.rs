use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// How much capacity a cached result consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Every entry weighs 1.
    #[default]
    Unit,
    /// 1 + number of alternative phenotypes.
    Alternatives,
}

impl WeightPolicy {
    pub fn weigh(self, alternatives: usize) -> u64 {
        match self {
            Self::Unit => 1,
            Self::Alternatives => 1 + alternatives as u64,
        }
    }
}

/// What an invalidation does to a computation already in flight for the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationPolicy {
    /// The in-flight computation still populates the cache when it finishes.
    #[default]
    LetInFlightComplete,
    /// The in-flight computation answers its waiters but is not cached.
    DiscardInFlight,
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total weight the cache may hold before LRU eviction.
    pub max_weight: u64,
    /// Age after which an entry is treated as absent.
    pub ttl_secs: u64,
    pub weight_policy: WeightPolicy,
    /// Interval of the background expiry sweep. 0 disables the sweeper;
    /// expired entries are then only purged lazily on lookup.
    pub sweep_interval_secs: u64,
    pub invalidation_policy: InvalidationPolicy,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_weight: defaults::DEFAULT_CACHE_MAX_WEIGHT,
            ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            weight_policy: WeightPolicy::default(),
            sweep_interval_secs: defaults::DEFAULT_SWEEP_INTERVAL_SECS,
            invalidation_policy: InvalidationPolicy::default(),
        }
    }
}
