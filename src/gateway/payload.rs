use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compliance::ComplianceReport;
use crate::report::{Document, Report};
use crate::standards::CodeVerification;

/// Body of `POST /api/verify`: the normalized page structure produced by the
/// OCR/table front end.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(alias = "document")]
    pub report: Document,
}

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub data: VerifyData,
}

/// The full verification outcome for one report.
#[derive(Debug, Serialize)]
pub struct VerifyData {
    /// Fields extracted from the document.
    pub fields: Report,
    /// Validity verdicts for the standards cited as judgment basis.
    pub standards: BTreeMap<String, CodeVerification>,
    /// Validity verdicts for the standards cited as test methods.
    pub method_standards: BTreeMap<String, CodeVerification>,
    /// Reconciliation against the regulatory inspection requirements.
    pub compliance: ComplianceReport,
}
