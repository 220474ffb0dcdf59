use thiserror::Error;

/// Errors returned by the standards-registry capability.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The HTTP client could not be constructed.
    #[error("failed to build registry client: {message}")]
    ClientBuild {
        /// Error message.
        message: String,
    },

    /// The JSON-RPC endpoint could not be reached.
    #[error("failed to connect to registry at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// A JSON-RPC call failed at the transport level.
    #[error("registry call '{method}' failed: {message}")]
    CallFailed {
        /// JSON-RPC method.
        method: String,
        /// Error message.
        message: String,
    },

    /// The response was neither valid JSON nor parseable SSE frames.
    #[error("malformed registry response for '{method}': {message}")]
    Malformed {
        /// JSON-RPC method.
        method: String,
        /// Error message.
        message: String,
    },

    /// A direct page fetch failed.
    #[error("failed to fetch registry page '{url}': {message}")]
    PageFetch {
        /// Page URL.
        url: String,
        /// Error message.
        message: String,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
