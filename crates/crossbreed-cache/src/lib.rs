//! # crossbreed-cache
//!
//! Result cache for completed cross predictions.
//!
//! - Keyed by the normalized `CrossKey`.
//! - Capacity bounded by total weight; least-recently-used entries go first,
//!   ties on last access broken by earlier creation.
//! - Entries older than the TTL are treated as absent and purged lazily on
//!   lookup, or eagerly by the optional [`ExpirySweeper`].
//! - Sharded storage (`DashMap`), so lookups of unrelated keys never contend
//!   on a single lock.

pub mod entry;
pub mod result_cache;
pub mod sweeper;

pub use entry::{CacheEntry, CacheStats};
pub use result_cache::ResultCache;
pub use sweeper::ExpirySweeper;
