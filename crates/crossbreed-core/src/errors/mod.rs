mod backend_error;
mod config_error;
mod cross_error;

pub use backend_error::BackendError;
pub use config_error::ConfigError;
pub use cross_error::CrossError;

/// Result alias used across the workspace.
pub type CrossOutcome<T> = Result<T, CrossError>;
