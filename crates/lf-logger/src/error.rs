//! Error types for logger construction.

use thiserror::Error;

/// Result type for configuration and logger setup.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration or building a logger.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config file extension is not `.json` or `.toml`.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The config parsed but failed semantic validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}
