//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that prevent the monitor from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no devices configured in 'devices' section")]
    NoDevices,

    #[error("device name '{0}' is configured more than once")]
    DuplicateDevice(String),

    #[error("invalid duration for {field}: '{value}'")]
    InvalidDuration { field: &'static str, value: String },
}
