use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crossbreed_core::CrossResult;

/// A cached result plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: CrossResult,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
    /// Logical access tick, bumped on insert and on every hit.
    pub access_seq: u64,
    /// Insertion order; final tie-break when timestamps are equal.
    pub created_seq: u64,
    pub weight: u64,
    /// Lookups served from this entry.
    pub hits: u64,
}

impl CacheEntry {
    pub(crate) fn new(
        result: CrossResult,
        now: DateTime<Utc>,
        access_seq: u64,
        created_seq: u64,
        weight: u64,
    ) -> Self {
        Self {
            result,
            created_at: now,
            last_access: now,
            access_seq,
            created_seq,
            weight,
            hits: 0,
        }
    }

    /// Expired once its age strictly exceeds `ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }

    /// Eviction order: smaller is evicted first.
    pub(crate) fn recency_rank(&self) -> (u64, DateTime<Utc>, u64) {
        (self.access_seq, self.created_at, self.created_seq)
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_weight: u64,
    pub max_weight: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
}
