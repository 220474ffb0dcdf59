//! gbcheck library crate (used by the server binary and integration tests).
//!
//! Verifies food inspection reports on three axes:
//!
//! - **Field extraction** ([`report`]): pulls the food name, production
//!   date, conclusion, cited standards, and itemized test rows out of the
//!   normalized OCR page structure.
//! - **Standards validity** ([`standards`], [`registry`]): checks that every
//!   cited GB code was legally in force on the production date, against the
//!   standards registry, with a daily on-disk cache.
//! - **Compliance reconciliation** ([`compliance`], [`evidence`],
//!   [`retrieval`]): retrieves the regulatory inspection requirements for
//!   the food, filters and parses the evidence tables, and reconciles the
//!   report's items, methods, bases, and limit indicators against them.
//!
//! The [`gateway`] module exposes the pipeline over HTTP.
//!
//! ## Test/Mock Support
//! Mock clients are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod compliance;
pub mod config;
pub mod evidence;
pub mod gateway;
pub mod matcher;
pub mod registry;
pub mod report;
pub mod retrieval;
pub mod standards;

pub use compliance::{
    BasisIssue, ComplianceEngine, ComplianceError, ComplianceReport, ComplianceStatus, Evidence,
    EvidenceKind, MatchedItem, MethodIssue,
};
pub use config::{Config, ConfigError};
pub use evidence::{ParsedTable, RequiredItem, find_inspection_items, parse_table};
pub use gateway::{HandlerState, create_router_with_state};
pub use matcher::{extract_names, fuzzy_match, fuzzy_match_code, normalize};
pub use registry::{McpRegistryClient, RegistryClient, RegistryError};
#[cfg(any(test, feature = "mock"))]
pub use registry::MockRegistryClient;
pub use report::{Document, InspectionItem, Page, Report, StandardRef, extractor};
pub use retrieval::{HttpRetrievalClient, RetrievalClient, RetrievalError, Snippet};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::MockRetrievalClient;
pub use standards::{
    CodeVerification, StandardInfo, StandardStatus, StandardsError, StandardsVerifier,
    ValidationResult, VerificationCache, VerificationStatus, gb_number,
};
