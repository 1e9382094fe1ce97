//! # crossbreed-observability
//!
//! Tracing subscriber setup, span macros for the resolve path, and the
//! lock-free counters behind `CrossEngine::stats`.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use tracing_setup::init_tracing;
