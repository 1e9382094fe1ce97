use serde::{Deserialize, Serialize};

use super::defaults;

/// Memoization of parent genetics lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub enabled: bool,
    pub max_entries: u64,
    pub ttl_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_LOOKUP_CACHE_ENABLED,
            max_entries: defaults::DEFAULT_LOOKUP_CACHE_MAX_ENTRIES,
            ttl_secs: defaults::DEFAULT_LOOKUP_CACHE_TTL_SECS,
        }
    }
}
