use thiserror::Error;

/// Errors returned by the retrieval capability.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The HTTP client could not be constructed.
    #[error("failed to build retrieval client: {message}")]
    ClientBuild {
        /// Error message.
        message: String,
    },

    /// The request failed at the transport level.
    #[error("retrieval request to '{url}' failed: {message}")]
    Request {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("retrieval endpoint returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response envelope signalled an application error.
    #[error("retrieval envelope error (code {code}): {message}")]
    Envelope {
        /// Envelope `code` field.
        code: i64,
        /// Envelope message.
        message: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("malformed retrieval response: {message}")]
    Malformed {
        /// Error message.
        message: String,
    },
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
