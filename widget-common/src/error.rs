//! Common error types for the widget workspace

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for widget configuration and setup
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping (config discovery, logging setup)
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML file could not be parsed
    #[error("Failed to parse {}: {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Tracing subscriber could not be installed
    #[error("Logging setup error: {0}")]
    Logging(String),
}
