//! Configuration error types

use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required environment variable
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Value present but not parseable into the expected type
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Connection string with an unsupported scheme
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),

    /// Cross-field validation failed
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
