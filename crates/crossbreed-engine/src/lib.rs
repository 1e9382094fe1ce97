//! # crossbreed-engine
//!
//! Resolves parent pairs into cached cross predictions.
//!
//! ```text
//! resolve(a, b)
//!   → normalize_key          (order-independent CrossKey)
//!   → ResultCache::get       hit: return copy with cached = true
//!   → Singleflight::run      one owner per key, everyone else waits
//!       → genetics lookup    (memoized with moka)
//!       → prediction backend
//!       → ResultCache::put   before the in-flight slot is released
//! ```
//!
//! ## The `cached` flag
//!
//! `cached` is false only for the caller whose request actually ran the
//! backend. Cache hits and callers that joined someone else's in-flight
//! computation both get `cached = true`, so N concurrent first requests
//! always produce exactly one `cached = false`.

pub mod engine;
pub mod genetics;
pub mod singleflight;
pub mod stats;

pub use engine::CrossEngine;
pub use genetics::CachedGeneticsLookup;
pub use singleflight::{Flight, Singleflight};
pub use stats::EngineStats;
