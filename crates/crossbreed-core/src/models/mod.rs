pub mod confidence;
pub mod cross_result;
pub mod genetics;
pub mod prediction;
pub mod strain;

pub use confidence::Confidence;
pub use cross_result::CrossResult;
pub use genetics::ParentGenetics;
pub use prediction::Prediction;
pub use strain::{Difficulty, GeneticProfile, StrainProfile, StrainType, Terpene};
