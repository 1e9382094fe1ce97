use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::prediction::Prediction;
use super::strain::StrainProfile;
use crate::key::CrossKey;

/// Outcome of crossing two parents.
///
/// Handed to callers by value; the cached copy is never shared mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossResult {
    pub key: CrossKey,
    pub strain: StrainProfile,
    pub confidence: Confidence,
    /// Alternative phenotype hypotheses, most likely first.
    pub alternatives: Vec<String>,
    pub warnings: Vec<String>,
    /// False only for the call that ran the backend.
    pub cached: bool,
    /// When the backend produced this prediction.
    pub computed_at: DateTime<Utc>,
}

impl CrossResult {
    /// Build a freshly computed result from a backend prediction.
    pub fn from_prediction(key: CrossKey, prediction: Prediction, computed_at: DateTime<Utc>) -> Self {
        Self {
            key,
            strain: prediction.strain,
            confidence: Confidence::new(prediction.confidence),
            alternatives: prediction.alternatives,
            warnings: prediction.warnings,
            cached: false,
            computed_at,
        }
    }

    /// Copy of this result flagged as served without running the backend.
    pub fn as_cached(&self) -> Self {
        Self {
            cached: true,
            ..self.clone()
        }
    }

    /// Whether two results carry the same prediction, ignoring the `cached` flag.
    pub fn same_payload(&self, other: &CrossResult) -> bool {
        self.key == other.key
            && self.strain == other.strain
            && self.confidence == other.confidence
            && self.alternatives == other.alternatives
            && self.warnings == other.warnings
            && self.computed_at == other.computed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::normalize_key;

    fn sample() -> CrossResult {
        let key = normalize_key("OG-Kush", "Blue-Dream").unwrap();
        let prediction = Prediction {
            strain: StrainProfile::named("s1", "OGBD-Hybrid", "OG-Kush", "Blue-Dream"),
            confidence: 1.4,
            alternatives: vec!["OGBD-Sativa-Lean".to_string()],
            warnings: vec![],
        };
        CrossResult::from_prediction(key, prediction, Utc::now())
    }

    #[test]
    fn from_prediction_clamps_and_marks_fresh() {
        let result = sample();
        assert!(!result.cached);
        assert_eq!(result.confidence.value(), 1.0);
    }

    #[test]
    fn cached_copy_keeps_payload() {
        let result = sample();
        let cached = result.as_cached();
        assert!(cached.cached);
        assert!(cached.same_payload(&result));
        assert_ne!(cached, result);
    }

    #[test]
    fn mutating_a_copy_leaves_stored_value_alone() {
        let result = sample();
        let mut copy = result.clone();
        copy.alternatives.push("Indica-Lean".to_string());
        copy.strain.name.push_str("-mut");
        assert_eq!(result.alternatives.len(), 1);
        assert_eq!(result.strain.name, "OGBD-Hybrid");
    }
}
