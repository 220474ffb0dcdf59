use thiserror::Error;

/// Compliance-engine configuration errors. Runtime retrieval failures are
/// not errors here; the engine degrades the verdict instead of aborting.
#[derive(Debug, Error)]
pub enum ComplianceError {
    /// No rules dataset configured for the retrieval client.
    #[error("no rules dataset configured")]
    MissingRulesDataset,
}

pub type ComplianceResult<T> = Result<T, ComplianceError>;
