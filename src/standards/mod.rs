//! Standards validity verification.
//!
//! For every GB code cited by a report this module determines, from the
//! registry's search and detail pages, whether the standard was legally in
//! force on the report's production date. Results are cached on disk for a
//! day keyed by `(code, production_date)`.

pub mod cache;
pub mod code;
pub mod download;
pub mod error;
pub mod scrape;
mod types;
pub mod validate;
pub mod verifier;

pub use cache::VerificationCache;
pub use code::gb_number;
pub use download::{DocumentStore, extract_download_url};
pub use error::{StandardsError, StandardsResult};
pub use types::{CodeVerification, StandardInfo, StandardStatus, VerificationStatus};
pub use validate::{ValidationResult, parse_flexible_date, validate_for_production_date};
pub use verifier::StandardsVerifier;
