//! ResultCache: completed predictions keyed by `CrossKey`.
//!
//! Weight accounting: `total_weight` is only increased while the shard lock
//! of the inserted key is held, so a concurrent removal can never subtract
//! an entry's weight before it was added.
//!
//! Recency is a logical tick, not the clock, so two accesses within the same
//! clock reading are still ordered. Finding an eviction victim scans every
//! entry under the eviction lock, which is O(n) per evicted entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crossbreed_core::config::CacheConfig;
use crossbreed_core::traits::{IClock, SystemClock};
use crossbreed_core::{CrossKey, CrossResult};

use crate::entry::{CacheEntry, CacheStats};

/// Weight-bounded LRU cache with TTL expiry.
pub struct ResultCache {
    entries: DashMap<CrossKey, CacheEntry>,
    clock: Arc<dyn IClock>,
    ttl: Duration,
    max_weight: u64,
    total_weight: AtomicU64,
    next_seq: AtomicU64,
    access_tick: AtomicU64,
    /// Serializes eviction passes only; lookups and inserts never take it.
    eviction_lock: Mutex<()>,
    evictions: AtomicU64,
    expirations: AtomicU64,
    invalidations: AtomicU64,
}

impl ResultCache {
    /// Create a cache from configuration, reading time from `clock`.
    pub fn new(config: &CacheConfig, clock: Arc<dyn IClock>) -> Self {
        Self::with_clock(config.max_weight, config.ttl(), clock)
    }

    /// Create a cache on the system clock.
    pub fn with_capacity(max_weight: u64, ttl: StdDuration) -> Self {
        Self::with_clock(max_weight, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(max_weight: u64, ttl: StdDuration, clock: Arc<dyn IClock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            max_weight,
            total_weight: AtomicU64::new(0),
            next_seq: AtomicU64::new(0),
            access_tick: AtomicU64::new(0),
            eviction_lock: Mutex::new(()),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Look up a live entry.
    ///
    /// A hit refreshes the entry's recency. An expired entry is removed and
    /// reported as a miss.
    pub fn get(&self, key: &CrossKey) -> Option<CrossResult> {
        let now = self.clock.now();
        let mut expired_seq = None;

        if let Some(mut entry) = self.entries.get_mut(key) {
            if entry.is_expired(now, self.ttl) {
                expired_seq = Some(entry.created_seq);
            } else {
                entry.last_access = now;
                entry.access_seq = self.next_access();
                entry.hits += 1;
                return Some(entry.result.clone());
            }
        }

        if let Some(seq) = expired_seq {
            if self.remove_matching(key, seq) {
                self.expirations.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "expired cross result purged on lookup");
            }
        }
        None
    }

    /// Insert or replace the entry for `key`.
    ///
    /// Evicts least-recently-used entries until the total weight fits.
    /// Returns false (and drops any previous entry for the key) when
    /// `weight` alone exceeds the capacity.
    pub fn put(&self, key: CrossKey, result: CrossResult, weight: u64) -> bool {
        let weight = weight.max(1);
        if weight > self.max_weight {
            debug!(
                key = %key,
                weight,
                max_weight = self.max_weight,
                "cross result heavier than cache capacity, not stored"
            );
            self.remove_any(&key);
            return false;
        }

        let now = self.clock.now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = CacheEntry::new(result, now, self.next_access(), seq, weight);

        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(entry);
                self.total_weight.fetch_add(weight, Ordering::SeqCst);
                self.total_weight.fetch_sub(previous.weight, Ordering::SeqCst);
            }
            Entry::Vacant(vacant) => {
                let _inserted = vacant.insert(entry);
                self.total_weight.fetch_add(weight, Ordering::SeqCst);
            }
        }

        if self.total_weight.load(Ordering::SeqCst) > self.max_weight {
            self.evict_until_fits(&key);
        }
        true
    }

    /// Remove the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &CrossKey) -> bool {
        let removed = self.remove_any(key);
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cross result invalidated");
        }
        removed
    }

    /// Remove every entry. Returns how many were dropped.
    pub fn invalidate_all(&self) -> usize {
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            self.total_weight.fetch_sub(entry.weight, Ordering::SeqCst);
            removed += 1;
            false
        });
        self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        info!(removed, "cross result cache cleared");
        removed
    }

    /// Remove every entry whose key satisfies `predicate`.
    pub fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CrossKey) -> bool,
    {
        let mut removed = 0usize;
        self.entries.retain(|key, entry| {
            if predicate(key) {
                self.total_weight.fetch_sub(entry.weight, Ordering::SeqCst);
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed > 0 {
            self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed, "cross results invalidated by predicate");
        }
        removed
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut purged = 0usize;
        self.entries.retain(|_, entry| {
            if entry.is_expired(now, self.ttl) {
                self.total_weight.fetch_sub(entry.weight, Ordering::SeqCst);
                purged += 1;
                false
            } else {
                true
            }
        });
        if purged > 0 {
            self.expirations.fetch_add(purged as u64, Ordering::Relaxed);
            debug!(purged, "expired cross results purged");
        }
        purged
    }

    /// Whether a live (unexpired) entry exists. Does not touch recency.
    pub fn contains(&self, key: &CrossKey) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired(now, self.ttl))
            .unwrap_or(false)
    }

    /// Snapshot of an entry and its bookkeeping, expired or not.
    /// Does not touch recency.
    pub fn peek(&self, key: &CrossKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Number of stored entries (including expired ones not yet purged).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight.load(Ordering::SeqCst)
    }

    pub fn max_weight(&self) -> u64 {
        self.max_weight
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            total_weight: self.total_weight(),
            max_weight: self.max_weight,
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    fn next_access(&self) -> u64 {
        self.access_tick.fetch_add(1, Ordering::Relaxed)
    }

    fn evict_until_fits(&self, keep: &CrossKey) {
        let _guard = self
            .eviction_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.total_weight.load(Ordering::SeqCst) > self.max_weight {
            self.purge_expired();
        }

        while self.total_weight.load(Ordering::SeqCst) > self.max_weight {
            let victim = self
                .entries
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().recency_rank())
                .map(|entry| (entry.key().clone(), entry.value().created_seq));

            let Some((victim_key, seq)) = victim else {
                break;
            };
            if self.remove_matching(&victim_key, seq) {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %victim_key, "evicted least-recently-used cross result");
            }
        }
    }

    /// Remove `key` only if it is still the entry inserted with `seq`.
    fn remove_matching(&self, key: &CrossKey, seq: u64) -> bool {
        match self.entries.remove_if(key, |_, entry| entry.created_seq == seq) {
            Some((_, entry)) => {
                self.total_weight.fetch_sub(entry.weight, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    fn remove_any(&self, key: &CrossKey) -> bool {
        match self.entries.remove(key) {
            Some((_, entry)) => {
                self.total_weight.fetch_sub(entry.weight, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossbreed_core::traits::ManualClock;
    use crossbreed_core::{normalize_key, Prediction, StrainProfile};

    const HOUR: StdDuration = StdDuration::from_secs(3600);

    fn result(a: &str, b: &str, alternatives: usize) -> (CrossKey, CrossResult) {
        let key = normalize_key(a, b).unwrap();
        let prediction = Prediction {
            strain: StrainProfile::named(format!("{a}-{b}"), format!("{a} x {b}"), a, b),
            confidence: 0.7,
            alternatives: (0..alternatives).map(|i| format!("pheno-{i}")).collect(),
            warnings: vec![],
        };
        let result = CrossResult::from_prediction(key.clone(), prediction, Utc::now());
        (key, result)
    }

    fn cache_with_clock(max_weight: u64) -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = ResultCache::with_clock(max_weight, HOUR, clock.clone());
        (cache, clock)
    }

    #[test]
    fn insert_and_get() {
        let (cache, _) = cache_with_clock(10);
        let (key, value) = result("a", "b", 0);
        assert!(cache.put(key.clone(), value.clone(), 1));
        assert_eq!(cache.get(&key), Some(value));
        assert_eq!(cache.peek(&key).unwrap().hits, 1);
    }

    #[test]
    fn miss_returns_none() {
        let (cache, _) = cache_with_clock(10);
        let (key, _) = result("a", "b", 0);
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn expired_entry_is_absent_and_purged() {
        let (cache, clock) = cache_with_clock(10);
        let (key, value) = result("a", "b", 0);
        cache.put(key.clone(), value, 1);

        clock.advance(Duration::seconds(3600));
        assert!(cache.get(&key).is_some(), "exactly at TTL is still live");

        clock.advance(Duration::milliseconds(1));
        assert!(!cache.contains(&key));
        assert_eq!(cache.get(&key), None);
        assert!(cache.peek(&key).is_none(), "lookup purges the expired entry");
        assert_eq!(cache.total_weight(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn access_refreshes_recency() {
        let (cache, clock) = cache_with_clock(2);
        let (k1, v1) = result("a", "b", 0);
        let (k2, v2) = result("c", "d", 0);
        let (k3, v3) = result("e", "f", 0);

        cache.put(k1.clone(), v1, 1);
        clock.advance(Duration::seconds(1));
        cache.put(k2.clone(), v2, 1);
        clock.advance(Duration::seconds(1));
        assert!(cache.get(&k1).is_some());
        clock.advance(Duration::seconds(1));
        cache.put(k3.clone(), v3, 1);

        assert!(cache.contains(&k1));
        assert!(!cache.contains(&k2), "k2 was least recently used");
        assert!(cache.contains(&k3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn access_within_the_same_tick_still_protects_entry() {
        let (cache, _) = cache_with_clock(2);
        let (k1, v1) = result("a", "b", 0);
        let (k2, v2) = result("c", "d", 0);
        let (k3, v3) = result("e", "f", 0);

        cache.put(k1.clone(), v1, 1);
        cache.put(k2.clone(), v2, 1);
        assert!(cache.get(&k1).is_some());
        cache.put(k3.clone(), v3, 1);

        assert!(cache.contains(&k1), "just-read entry must survive");
        assert!(!cache.contains(&k2));
        assert!(cache.contains(&k3));
        assert_eq!(cache.peek(&k1).unwrap().last_access, cache.peek(&k3).unwrap().created_at);
    }

    #[test]
    fn untouched_entries_evict_in_insertion_order() {
        let (cache, _) = cache_with_clock(2);
        let (k1, v1) = result("a", "b", 0);
        let (k2, v2) = result("c", "d", 0);
        let (k3, v3) = result("e", "f", 0);

        cache.put(k1.clone(), v1, 1);
        cache.put(k2.clone(), v2, 1);
        cache.put(k3.clone(), v3, 1);

        assert!(!cache.contains(&k1));
        assert!(cache.contains(&k2));
        assert!(cache.contains(&k3));
    }

    #[test]
    fn heavy_insert_evicts_several() {
        let (cache, clock) = cache_with_clock(5);
        for (i, pair) in [("a", "b"), ("c", "d"), ("e", "f")].iter().enumerate() {
            let (key, value) = result(pair.0, pair.1, 0);
            cache.put(key, value, 1);
            clock.advance(Duration::seconds(i as i64 + 1));
        }
        assert_eq!(cache.total_weight(), 3);

        let (heavy, value) = result("g", "h", 3);
        cache.put(heavy.clone(), value, 4);

        assert!(cache.contains(&heavy));
        assert!(cache.total_weight() <= 5);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&normalize_key("e", "f").unwrap()));
    }

    #[test]
    fn oversize_entry_is_not_stored() {
        let (cache, _) = cache_with_clock(3);
        let (key, value) = result("a", "b", 0);
        cache.put(key.clone(), value.clone(), 1);
        assert!(!cache.put(key.clone(), value, 4));
        assert!(!cache.contains(&key));
        assert_eq!(cache.total_weight(), 0);
    }

    #[test]
    fn replace_adjusts_weight() {
        let (cache, _) = cache_with_clock(10);
        let (key, value) = result("a", "b", 0);
        cache.put(key.clone(), value.clone(), 3);
        cache.put(key.clone(), value, 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_weight(), 2);
    }

    #[test]
    fn zero_weight_counts_as_one() {
        let (cache, _) = cache_with_clock(10);
        let (key, value) = result("a", "b", 0);
        cache.put(key, value, 0);
        assert_eq!(cache.total_weight(), 1);
    }

    #[test]
    fn invalidate_removes_immediately() {
        let (cache, _) = cache_with_clock(10);
        let (key, value) = result("a", "b", 0);
        cache.put(key.clone(), value, 1);
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.total_weight(), 0);
    }

    #[test]
    fn invalidate_all_clears_everything() {
        let (cache, _) = cache_with_clock(10);
        for pair in [("a", "b"), ("c", "d"), ("e", "f")] {
            let (key, value) = result(pair.0, pair.1, 0);
            cache.put(key, value, 2);
        }
        assert_eq!(cache.invalidate_all(), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.total_weight(), 0);
        assert_eq!(cache.stats().invalidations, 3);
    }

    #[test]
    fn invalidate_where_drops_only_matching_keys() {
        let (cache, _) = cache_with_clock(10);
        for pair in [("og kush", "gelato"), ("og kush", "haze"), ("haze", "gelato")] {
            let (key, value) = result(pair.0, pair.1, 0);
            cache.put(key, value, 2);
        }
        assert_eq!(cache.invalidate_where(|key| key.involves("OG Kush")), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_weight(), 2);
        assert!(cache.contains(&normalize_key("gelato", "haze").unwrap()));
    }

    #[test]
    fn purge_expired_keeps_live_entries() {
        let (cache, clock) = cache_with_clock(10);
        let (old, v1) = result("a", "b", 0);
        cache.put(old.clone(), v1, 1);
        clock.advance(Duration::minutes(45));
        let (fresh, v2) = result("c", "d", 0);
        cache.put(fresh.clone(), v2, 1);
        clock.advance(Duration::minutes(30));

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.peek(&old).is_none());
        assert!(cache.contains(&fresh));
        assert_eq!(cache.total_weight(), 1);
    }

    #[test]
    fn expired_entries_go_before_live_ones() {
        let (cache, clock) = cache_with_clock(2);
        let (stale, v1) = result("a", "b", 0);
        cache.put(stale.clone(), v1, 1);
        clock.advance(Duration::minutes(50));
        let (live, v2) = result("c", "d", 0);
        cache.put(live.clone(), v2, 1);
        clock.advance(Duration::minutes(20));
        let (newest, v3) = result("e", "f", 0);
        cache.put(newest.clone(), v3, 1);

        assert!(cache.peek(&stale).is_none());
        assert!(cache.contains(&live));
        assert!(cache.contains(&newest));
        assert_eq!(cache.stats().evictions, 0);
    }
}
