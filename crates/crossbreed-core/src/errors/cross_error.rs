use super::{BackendError, ConfigError};

/// Top-level error for every crossbreed operation.
///
/// `Clone` so a single outcome can be handed to every waiter of an
/// in-flight computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrossError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("parent not found: {parent}")]
    ParentNotFound { parent: String },

    #[error("prediction backend error: {0}")]
    PredictionBackend(#[from] BackendError),

    #[error("cache internal error: {details}")]
    CacheInternal { details: String },

    #[error("gave up waiting for in-flight prediction {key} after {waited_ms}ms")]
    WaitTimedOut { key: String, waited_ms: u64 },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CrossError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn parent_not_found(parent: impl Into<String>) -> Self {
        Self::ParentNotFound {
            parent: parent.into(),
        }
    }

    pub fn cache_internal(details: impl Into<String>) -> Self {
        Self::CacheInternal {
            details: details.into(),
        }
    }

    /// Whether a fresh top-level request has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PredictionBackend(e) => e.is_transient(),
            Self::WaitTimedOut { .. } => true,
            _ => false,
        }
    }
}
