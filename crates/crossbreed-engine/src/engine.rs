//! CrossEngine: the entry point for crossbreed.
//!
//! Ties key normalization, the result cache, singleflight coordination,
//! genetics lookup and the prediction backend together behind `resolve`.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crossbreed_cache::{ExpirySweeper, ResultCache};
use crossbreed_core::config::InvalidationPolicy;
use crossbreed_core::traits::{IClock, IGeneticsLookup, IPredictionBackend, SystemClock};
use crossbreed_core::{
    normalize_key, CrossError, CrossKey, CrossOutcome, CrossResult, CrossbreedConfig,
    ParentGenetics, ParentRef,
};
use crossbreed_observability::{compute_span, invalidate_span, resolve_span, EngineMetrics};

use crate::genetics::CachedGeneticsLookup;
use crate::singleflight::Singleflight;
use crate::stats::EngineStats;

/// Cross prediction cache engine.
///
/// `Send + Sync`; share it between threads with `Arc`. Every unique parent
/// pair reaches the backend at most once per cache lifetime, no matter how
/// many callers ask for it concurrently.
pub struct CrossEngine {
    config: CrossbreedConfig,
    cache: Arc<ResultCache>,
    flights: Singleflight<CrossResult>,
    backend: Arc<dyn IPredictionBackend>,
    /// The memoizing wrapper when enabled, the raw lookup otherwise.
    lookup: Arc<dyn IGeneticsLookup>,
    memo: Option<Arc<CachedGeneticsLookup>>,
    clock: Arc<dyn IClock>,
    metrics: EngineMetrics,
    model_version: RwLock<String>,
    sweeper: Mutex<Option<ExpirySweeper>>,
}

impl CrossEngine {
    /// Create an engine on the system clock.
    pub fn new(
        config: CrossbreedConfig,
        backend: Arc<dyn IPredictionBackend>,
        lookup: Arc<dyn IGeneticsLookup>,
    ) -> CrossOutcome<Self> {
        Self::with_clock(config, backend, lookup, Arc::new(SystemClock))
    }

    /// Create an engine reading time from `clock`.
    ///
    /// Validates `config` and starts the expiry sweeper when
    /// `cache.sweep_interval_secs` is non-zero.
    pub fn with_clock(
        config: CrossbreedConfig,
        backend: Arc<dyn IPredictionBackend>,
        lookup: Arc<dyn IGeneticsLookup>,
        clock: Arc<dyn IClock>,
    ) -> CrossOutcome<Self> {
        config.validate()?;

        let cache = Arc::new(ResultCache::new(&config.cache, Arc::clone(&clock)));
        let memo = config
            .lookup
            .enabled
            .then(|| Arc::new(CachedGeneticsLookup::new(Arc::clone(&lookup), &config.lookup)));
        let lookup: Arc<dyn IGeneticsLookup> = match &memo {
            Some(memo) => Arc::clone(memo) as Arc<dyn IGeneticsLookup>,
            None => lookup,
        };
        let sweeper = match config.cache.sweep_interval() {
            Some(interval) => Some(ExpirySweeper::spawn(Arc::clone(&cache), interval)?),
            None => None,
        };
        let model_version = backend.model_version();

        info!(
            backend = backend.name(),
            model_version = %model_version,
            max_weight = config.cache.max_weight,
            ttl_secs = config.cache.ttl_secs,
            invalidation = ?config.cache.invalidation_policy,
            "CrossEngine initialized"
        );

        Ok(Self {
            config,
            cache,
            flights: Singleflight::new(),
            backend,
            lookup,
            memo,
            clock,
            metrics: EngineMetrics::new(),
            model_version: RwLock::new(model_version),
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Resolve the cross of two parents, computing it at most once.
    ///
    /// Parent order does not matter. The returned copy has `cached = false`
    /// only if this call ran the backend.
    pub fn resolve(&self, parent_a: impl AsRef<str>, parent_b: impl AsRef<str>) -> CrossOutcome<CrossResult> {
        self.resolve_inner(parent_a.as_ref(), parent_b.as_ref(), None)
    }

    /// Like [`resolve`](Self::resolve), but gives up with
    /// `CrossError::WaitTimedOut` after waiting `timeout` on another caller's
    /// computation. That computation keeps running and still fills the cache.
    pub fn resolve_with_timeout(
        &self,
        parent_a: impl AsRef<str>,
        parent_b: impl AsRef<str>,
        timeout: Duration,
    ) -> CrossOutcome<CrossResult> {
        self.resolve_inner(parent_a.as_ref(), parent_b.as_ref(), Some(timeout))
    }

    fn resolve_inner(&self, parent_a: &str, parent_b: &str, timeout: Option<Duration>) -> CrossOutcome<CrossResult> {
        let key = normalize_key(parent_a, parent_b)?;
        let span = resolve_span!(key);
        let _entered = span.enter();

        if let Some(hit) = self.cache.get(&key) {
            self.metrics.record_hit();
            debug!(key = %key, "cross result served from cache");
            return Ok(hit.as_cached());
        }
        self.metrics.record_miss();

        let compute = || self.compute(&key);
        let commit = |result: &CrossResult| self.commit(&key, result);
        let outcome = match timeout {
            Some(timeout) => self.flights.run_with_timeout(&key, timeout, compute, commit),
            None => self.flights.run(&key, compute, commit),
        };

        match outcome {
            Ok(flight) if flight.shared => {
                self.metrics.record_coalesced();
                Ok(flight.value.as_cached())
            }
            Ok(flight) => {
                if flight.discarded {
                    self.metrics.record_discarded_stale();
                    debug!(key = %key, "result invalidated mid-flight, not cached");
                }
                Ok(flight.value)
            }
            Err(err) => {
                if matches!(err, CrossError::WaitTimedOut { .. }) {
                    self.metrics.record_wait_timeout();
                }
                Err(err)
            }
        }
    }

    /// Owner-side computation. Runs outside every lock.
    fn compute(&self, key: &CrossKey) -> CrossOutcome<CrossResult> {
        // A previous owner may have committed between our cache miss and
        // taking ownership.
        if let Some(hit) = self.cache.get(key) {
            debug!(key = %key, "cross result committed before ownership, reusing it");
            return Ok(hit.as_cached());
        }

        let (first, second) = key.parents();
        let genetics_a = self.lookup_parent(first)?;
        let genetics_b = if key.is_self_cross() {
            genetics_a.clone()
        } else {
            self.lookup_parent(second)?
        };

        let span = compute_span!(key, self.backend.name());
        let _entered = span.enter();
        self.metrics.record_computation();
        let started = Instant::now();

        let prediction = self.backend.predict(&genetics_a, &genetics_b).map_err(|e| {
            self.metrics.record_backend_failure();
            warn!(key = %key, error = %e, transient = e.is_transient(), "prediction backend failed");
            CrossError::from(e)
        })?;

        let result = CrossResult::from_prediction(key.clone(), prediction, self.clock.now());
        info!(
            key = %key,
            strain = %result.strain.name,
            confidence = result.confidence.value(),
            alternatives = result.alternatives.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cross predicted"
        );
        Ok(result)
    }

    fn commit(&self, key: &CrossKey, result: &CrossResult) {
        // Reused hits are already stored; re-putting would reset their TTL.
        if result.cached {
            return;
        }
        let weight = self.config.cache.weight_policy.weigh(result.alternatives.len());
        if !self.cache.put(key.clone(), result.clone(), weight) {
            warn!(key = %key, weight, "cross result too heavy for the cache, served uncached");
        }
    }

    fn lookup_parent(&self, canonical: &str) -> CrossOutcome<ParentGenetics> {
        self.lookup.lookup(&ParentRef::new(canonical)).map_err(|e| {
            self.metrics.record_lookup_failure();
            debug!(parent = canonical, error = %e, "genetics lookup failed");
            e
        })
    }

    /// Drop the cached cross of two parents. Returns whether one was cached.
    pub fn invalidate(&self, parent_a: impl AsRef<str>, parent_b: impl AsRef<str>) -> CrossOutcome<bool> {
        let key = normalize_key(parent_a, parent_b)?;
        let span = invalidate_span!(key);
        let _entered = span.enter();

        if self.discards_in_flight() && self.flights.mark_stale(&key) {
            debug!(key = %key, "in-flight computation marked stale");
        }
        Ok(self.cache.invalidate(&key))
    }

    /// Drop every cached cross. Returns how many entries were removed.
    pub fn invalidate_all(&self) -> usize {
        let span = invalidate_span!("all");
        let _entered = span.enter();

        if self.discards_in_flight() {
            let stale = self.flights.mark_all_stale();
            if stale > 0 {
                debug!(stale, "in-flight computations marked stale");
            }
        }
        self.cache.invalidate_all()
    }

    /// Drop every cached cross involving `parent` and forget its memoized
    /// genetics. Returns how many entries were removed.
    pub fn invalidate_parent(&self, parent: impl AsRef<str>) -> CrossOutcome<usize> {
        let parent = ParentRef::new(parent.as_ref());
        let canonical = parent.canonical()?;
        let span = invalidate_span!(canonical);
        let _entered = span.enter();

        let involves = |key: &CrossKey| {
            let (first, second) = key.parents();
            first == canonical || second == canonical
        };
        if self.discards_in_flight() {
            self.flights.mark_stale_where(involves);
        }
        let removed = self.cache.invalidate_where(involves);
        if let Some(memo) = &self.memo {
            memo.forget(&parent);
        }

        info!(parent = %canonical, removed, "crosses involving parent invalidated");
        Ok(removed)
    }

    /// Record a new backend model version and clear the cache.
    ///
    /// In-flight computations are always marked stale here, whatever the
    /// invalidation policy: they were started against the old model.
    pub fn on_model_changed(&self, version: impl Into<String>) -> usize {
        let version = version.into();
        let previous = {
            let mut current = self
                .model_version
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, version.clone())
        };

        let stale = self.flights.mark_all_stale();
        let removed = self.cache.invalidate_all();
        info!(
            previous = %previous,
            current = %version,
            removed,
            stale,
            "prediction model changed, cross results cleared"
        );
        removed
    }

    /// Ask the backend for its model version and run
    /// [`on_model_changed`](Self::on_model_changed) if it moved.
    pub fn refresh_model_version(&self) -> bool {
        let latest = self.backend.model_version();
        if latest == self.model_version() {
            return false;
        }
        self.on_model_changed(latest);
        true
    }

    pub fn model_version(&self) -> String {
        self.model_version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            metrics: self.metrics.snapshot(),
            cache: self.cache.stats(),
            in_flight: self.flights.in_flight_count(),
            memoized_parents: self.memo.as_ref().map(|memo| memo.len()).unwrap_or(0),
            model_version: self.model_version(),
        }
    }

    /// Whether a live result for the pair is cached. Does not touch recency.
    pub fn is_cached(&self, parent_a: impl AsRef<str>, parent_b: impl AsRef<str>) -> CrossOutcome<bool> {
        let key = normalize_key(parent_a, parent_b)?;
        Ok(self.cache.contains(&key))
    }

    /// Callers currently blocked on the in-flight computation for the pair.
    pub fn waiters(&self, parent_a: impl AsRef<str>, parent_b: impl AsRef<str>) -> CrossOutcome<usize> {
        let key = normalize_key(parent_a, parent_b)?;
        Ok(self.flights.waiters(&key))
    }

    pub fn config(&self) -> &CrossbreedConfig {
        &self.config
    }

    /// Stop the background expiry sweeper, if one is running. Idempotent.
    pub fn close(&self) {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut sweeper) = sweeper {
            sweeper.shutdown();
            info!("CrossEngine closed");
        }
    }

    fn discards_in_flight(&self) -> bool {
        self.config.cache.invalidation_policy == InvalidationPolicy::DiscardInFlight
    }
}

impl Drop for CrossEngine {
    fn drop(&mut self) {
        self.close();
    }
}
