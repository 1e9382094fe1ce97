//! # crossbreed-core
//!
//! Foundation crate for the crossbreed prediction cache.
//! Defines the pair key, strain and result models, the collaborator traits
//! (prediction backend, genetics lookup, clock), errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod key;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::CrossbreedConfig;
pub use errors::{BackendError, ConfigError, CrossError, CrossOutcome};
pub use key::{normalize_key, CrossKey, ParentRef};
pub use models::{Confidence, CrossResult, ParentGenetics, Prediction, StrainProfile};
