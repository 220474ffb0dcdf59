//! Compliance reconciliation between report items and regulatory
//! requirements.
//!
//! Evidence snippets pass through a layered filter cascade (query shaping,
//! similarity gates, structural checks), get parsed into required items, and
//! are reconciled against the report's itemized rows with fuzzy matching.
//! Matched items additionally have their test method, judgment basis, and
//! limit indicators checked.

pub mod engine;
pub mod error;
pub mod limits;
mod types;

pub use engine::ComplianceEngine;
pub use error::{ComplianceError, ComplianceResult as ComplianceEngineResult};
pub use types::{
    BasisIssue, ComplianceReport, ComplianceStatus, Evidence, EvidenceKind, MatchedItem,
    MethodIssue,
};
