//! Memoized parent genetics lookups using moka.
//!
//! Every cross needs two lookups and popular parents show up in many
//! crosses, so successful lookups are kept for `lookup.ttl_secs`.
//! Failures (including `ParentNotFound`) are never memoized.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use crossbreed_core::config::defaults::MAX_LOOKUP_CACHE_TTL_SECS;
use crossbreed_core::config::LookupConfig;
use crossbreed_core::traits::IGeneticsLookup;
use crossbreed_core::{CrossOutcome, ParentGenetics, ParentRef};

/// An [`IGeneticsLookup`] wrapper with a bounded in-memory cache.
///
/// Keys are canonical parent refs, so `"OG Kush"` and `"og_kush"` share an
/// entry. Concurrent misses for the same parent run the inner lookup once.
pub struct CachedGeneticsLookup {
    inner: Arc<dyn IGeneticsLookup>,
    cache: Cache<String, ParentGenetics>,
}

impl CachedGeneticsLookup {
    pub fn new(inner: Arc<dyn IGeneticsLookup>, config: &LookupConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if config.ttl_secs > 0 {
            let ttl_secs = config.ttl_secs.min(MAX_LOOKUP_CACHE_TTL_SECS);
            builder = builder.time_to_live(Duration::from_secs(ttl_secs));
        }
        Self {
            inner,
            cache: builder.build(),
        }
    }

    /// Drop the memoized record for `parent`, if any.
    pub fn forget(&self, parent: &ParentRef) {
        if let Ok(canonical) = parent.canonical() {
            self.cache.invalidate(&canonical);
        }
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Whether a record for `parent` is memoized.
    pub fn contains(&self, parent: &ParentRef) -> bool {
        parent
            .canonical()
            .map(|canonical| self.cache.contains_key(&canonical))
            .unwrap_or(false)
    }

    /// Approximate number of memoized records.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IGeneticsLookup for CachedGeneticsLookup {
    fn lookup(&self, parent: &ParentRef) -> CrossOutcome<ParentGenetics> {
        let canonical = parent.canonical()?;
        self.cache
            .try_get_with(canonical, || {
                debug!(parent = %parent, "genetics lookup miss");
                self.inner.lookup(parent)
            })
            .map_err(|e| (*e).clone())
    }
}
