use std::sync::Arc;

use crate::compliance::ComplianceEngine;
use crate::registry::RegistryClient;
use crate::retrieval::RetrievalClient;
use crate::standards::StandardsVerifier;

/// Shared handler dependencies, injected at startup. Generic over both
/// clients so tests run the full router against mocks.
pub struct HandlerState<R, C>
where
    R: RegistryClient + Send + Sync + 'static,
    C: RetrievalClient + Send + Sync + 'static,
{
    pub verifier: Arc<StandardsVerifier<R>>,
    pub engine: Arc<ComplianceEngine<C>>,
}

impl<R, C> HandlerState<R, C>
where
    R: RegistryClient + Send + Sync + 'static,
    C: RetrievalClient + Send + Sync + 'static,
{
    pub fn new(verifier: Arc<StandardsVerifier<R>>, engine: Arc<ComplianceEngine<C>>) -> Self {
        Self { verifier, engine }
    }
}

// Manual impl: the clients sit behind Arcs, so no Clone bound on R or C.
impl<R, C> Clone for HandlerState<R, C>
where
    R: RegistryClient + Send + Sync + 'static,
    C: RetrievalClient + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            engine: Arc::clone(&self.engine),
        }
    }
}
