use crate::errors::BackendError;
use crate::models::{ParentGenetics, Prediction};

/// Strain prediction backend (typically a remote model).
///
/// May be slow, rate-limited, or non-deterministic in latency. The engine
/// guarantees at most one concurrent `predict` call per parent pair.
pub trait IPredictionBackend: Send + Sync {
    /// Predict the outcome of crossing `parent_a` with `parent_b`.
    fn predict(
        &self,
        parent_a: &ParentGenetics,
        parent_b: &ParentGenetics,
    ) -> Result<Prediction, BackendError>;

    /// Identifier of the model currently answering predictions.
    fn model_version(&self) -> String;

    /// Human-readable backend name.
    fn name(&self) -> &str;
}
