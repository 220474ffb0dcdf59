use thiserror::Error;

/// Errors raised by standards verification plumbing. Per-code lookup
/// failures are not errors at this level; they surface as `error`-status
/// results to keep the batch alive.
#[derive(Debug, Error)]
pub enum StandardsError {
    /// The cache file exists but could not be read.
    #[error("failed to read verification cache '{path}': {message}")]
    CacheRead {
        /// Cache file path.
        path: String,
        /// Error message.
        message: String,
    },

    /// The cache file could not be written.
    #[error("failed to write verification cache '{path}': {message}")]
    CacheWrite {
        /// Cache file path.
        path: String,
        /// Error message.
        message: String,
    },

    /// The cache file held invalid JSON.
    #[error("corrupt verification cache '{path}': {message}")]
    CacheParse {
        /// Cache file path.
        path: String,
        /// Error message.
        message: String,
    },

    /// The document-download HTTP client could not be constructed.
    #[error("failed to build document download client: {message}")]
    DownloadClientBuild {
        /// Error message.
        message: String,
    },
}

pub type StandardsResult<T> = Result<T, StandardsError>;
