//! Span definitions per operation: resolve, compute, invalidate.
//!
//! Each span carries the cross key and whatever metadata the operation has.

/// Create a resolve span (one per top-level `resolve` call).
#[macro_export]
macro_rules! resolve_span {
    ($key:expr) => {
        tracing::debug_span!("crossbreed.resolve", key = %$key)
    };
}

/// Create a compute span (the singleflight owner's backend call).
#[macro_export]
macro_rules! compute_span {
    ($key:expr, $backend:expr) => {
        tracing::info_span!("crossbreed.compute", key = %$key, backend = %$backend)
    };
}

/// Create an invalidation span.
#[macro_export]
macro_rules! invalidate_span {
    ($scope:expr) => {
        tracing::info_span!("crossbreed.invalidate", scope = %$scope)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RESOLVE: &str = "crossbreed.resolve";
    pub const COMPUTE: &str = "crossbreed.compute";
    pub const INVALIDATE: &str = "crossbreed.invalidate";
}
