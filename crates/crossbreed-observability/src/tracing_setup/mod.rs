//! Global subscriber installation.

pub mod spans;

use tracing_subscriber::EnvFilter;

use crossbreed_core::config::ObservabilityConfig;
use crossbreed_core::ConfigError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.log_level` when set. Returns `Ok(false)` if a
/// global subscriber was already installed (e.g. by the host application).
pub fn init_tracing(config: &ObservabilityConfig) -> Result<bool, ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.log_level)?,
    };

    let installed = if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
    };
    Ok(installed)
}

/// Parse a level or directive string into an `EnvFilter`.
pub fn build_filter(directive: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(directive).map_err(|e| ConfigError::ValidationFailed {
        field: "observability.log_level".to_string(),
        message: e.to_string(),
    })
}
