//! Standards-registry lookup capability.
//!
//! The registry is reached through a JSON-RPC 2.0 tool server (`initialize`,
//! `tools/list`, `tools/call`) whose responses may arrive as plain JSON or
//! as SSE `data:` frames. The client exposes exactly the two operations the
//! standards verifier needs: the rendered site-search page for a GB number
//! and the rendered content of an arbitrary registry page.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{McpRegistryClient, RegistryClient};
pub use error::{RegistryError, RegistryResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockRegistryClient;
