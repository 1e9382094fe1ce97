use serde::{Deserialize, Serialize};

use super::strain::StrainProfile;

/// Raw output of a prediction backend for one cross.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub strain: StrainProfile,
    /// Unclamped; the engine clamps into [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
