//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The local config file exists but could not be read.
    #[error("failed to read config file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// The local config file held invalid JSON.
    #[error("failed to parse config file '{path}': {message}")]
    FileParse { path: PathBuf, message: String },

    /// A retrieval URL was configured without an API key.
    #[error("retrieval URL configured but no API key set")]
    MissingRetrievalKey,

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },
}
