/// Prediction backend failures.
///
/// Transient failures (rate limits, timeouts) are worth retrying with a new
/// top-level request; permanent ones (malformed model output) are not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("transient backend failure: {reason}")]
    Transient { reason: String },

    #[error("permanent backend failure: {reason}")]
    Permanent { reason: String },
}

impl BackendError {
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent {
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
