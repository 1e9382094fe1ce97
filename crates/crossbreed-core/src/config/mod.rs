//! Configuration for the crossbreed engine.
//!
//! # Examples
//!
//! ```
//! use crossbreed_core::config::{CrossbreedConfig, WeightPolicy};
//!
//! let config = CrossbreedConfig::from_toml(
//!     r#"
//!     [cache]
//!     max_weight = 500
//!     weight_policy = "alternatives"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.cache.max_weight, 500);
//! assert_eq!(config.cache.weight_policy, WeightPolicy::Alternatives);
//! ```

pub mod cache_config;
pub mod defaults;
pub mod lookup_config;
pub mod observability_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::{CacheConfig, InvalidationPolicy, WeightPolicy};
pub use lookup_config::LookupConfig;
pub use observability_config::ObservabilityConfig;

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CrossbreedConfig {
    pub cache: CacheConfig,
    pub lookup: LookupConfig,
    pub observability: ObservabilityConfig,
}

impl CrossbreedConfig {
    /// Parse and validate configuration from a TOML string.
    /// Missing sections and keys fall back to compiled defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_weight == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "cache.max_weight".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "cache.ttl_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.lookup.enabled && self.lookup.max_entries == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "lookup.max_entries".to_string(),
                message: "must be greater than 0 when the lookup cache is enabled".to_string(),
            });
        }
        if self.lookup.ttl_secs > defaults::MAX_LOOKUP_CACHE_TTL_SECS {
            return Err(ConfigError::ValidationFailed {
                field: "lookup.ttl_secs".to_string(),
                message: format!(
                    "must be at most {} seconds",
                    defaults::MAX_LOOKUP_CACHE_TTL_SECS
                ),
            });
        }
        if self.observability.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "observability.log_level".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
