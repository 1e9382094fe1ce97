use serde::{Deserialize, Serialize};

use super::strain::{GeneticProfile, StrainType, Terpene};
use crate::key::ParentRef;

/// Genetic record of a parent, as resolved by an `IGeneticsLookup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentGenetics {
    pub parent: ParentRef,
    pub strain_type: StrainType,
    pub thc: f64,
    pub cbd: f64,
    #[serde(default)]
    pub terpenes: Vec<Terpene>,
    #[serde(default)]
    pub genetics: GeneticProfile,
}
