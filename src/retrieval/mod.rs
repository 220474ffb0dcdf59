//! Regulatory-rules retrieval capability.
//!
//! Queries a RAGFlow-style retrieval endpoint and returns ranked snippets
//! with similarity scores and provenance. The compliance engine is generic
//! over [`RetrievalClient`], so tests run against the mock.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod types;

pub use client::{HttpRetrievalClient, RetrievalClient};
pub use error::{RetrievalError, RetrievalResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockRetrievalClient;
pub use types::Snippet;
