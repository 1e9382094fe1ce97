use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dominant lineage of a strain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrainType {
    Sativa,
    Indica,
    #[default]
    Hybrid,
}

/// Cultivation difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A terpene and its share of the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terpene {
    pub name: String,
    /// Percentage by dry weight.
    pub percentage: f64,
    pub effects: Vec<String>,
}

/// Grow-relevant genetic traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneticProfile {
    pub phenotypes: Vec<String>,
    /// Flowering time in weeks.
    pub flowering_time_weeks: u32,
    #[serde(rename = "yield")]
    pub yield_estimate: String,
    pub difficulty: Difficulty,
    pub resistance: Vec<String>,
    pub dominant_traits: Vec<String>,
}

/// The strain derived by a cross.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainProfile {
    pub id: String,
    pub name: String,
    pub parent_a: String,
    pub parent_b: String,
    pub strain_type: StrainType,
    pub thc: f64,
    pub cbd: f64,
    pub terpenes: Vec<Terpene>,
    pub effects: Vec<String>,
    pub flavors: Vec<String>,
    pub genetics: GeneticProfile,
    pub created_at: DateTime<Utc>,
}

impl StrainProfile {
    /// Minimal profile with just identity fields set; everything else empty.
    pub fn named(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_a: impl Into<String>,
        parent_b: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_a: parent_a.into(),
            parent_b: parent_b.into(),
            strain_type: StrainType::Hybrid,
            thc: 0.0,
            cbd: 0.0,
            terpenes: Vec::new(),
            effects: Vec::new(),
            flavors: Vec::new(),
            genetics: GeneticProfile::default(),
            created_at: Utc::now(),
        }
    }
}
