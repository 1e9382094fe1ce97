// Single source of truth for all default values.

// --- Result cache ---
pub const DEFAULT_CACHE_MAX_WEIGHT: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 604_800; // 7 days
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 0; // disabled

// --- Genetics lookup memoization ---
pub const DEFAULT_LOOKUP_CACHE_ENABLED: bool = true;
pub const DEFAULT_LOOKUP_CACHE_MAX_ENTRIES: u64 = 5_000;
pub const DEFAULT_LOOKUP_CACHE_TTL_SECS: u64 = 3_600; // 1 hour
/// Longest time-to-live moka accepts (1000 years).
pub const MAX_LOOKUP_CACHE_TTL_SECS: u64 = 1_000 * 365 * 24 * 3_600;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
