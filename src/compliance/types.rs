use serde::{Deserialize, Serialize};

/// Overall compliance verdict for one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    #[default]
    Pass,
    /// Required items are missing from the report.
    Fail,
    /// Matched, but with method/basis/indicator inconsistencies, or with
    /// too little evidence to reconcile.
    Warning,
    /// Not verifiable: no food name, no retrieval client, or no evidence.
    Unknown,
}

/// Provenance class of an evidence entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// A snippet that supplied required inspection items.
    Requirement,
    /// A snippet used to verify one item's limit indicator.
    Indicator,
}

/// One snippet retained as supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_name: Option<String>,
    /// Item an indicator snippet belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Limit value extracted from an indicator snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_limit: Option<String>,
}

/// A required item matched against a report row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedItem {
    /// Name as it appears in the requirement table.
    pub required_name: String,
    /// Name as it appears in the report.
    pub report_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_basis: Option<String>,
}

/// Test-method mismatch for one matched item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodIssue {
    pub item: String,
    pub expected: String,
    pub actual: String,
}

/// Judgment-basis mismatch for one matched item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisIssue {
    pub item: String,
    pub expected: String,
    pub cited: Vec<String>,
}

/// Full reconciliation outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub status: ComplianceStatus,
    pub issues: Vec<String>,
    pub evidence: Vec<Evidence>,
    pub missing_items: Vec<String>,
    pub extra_items: Vec<String>,
    pub matched_items: Vec<MatchedItem>,
    pub method_issues: Vec<MethodIssue>,
    pub basis_issues: Vec<BasisIssue>,
    pub indicator_issues: Vec<String>,
}

impl ComplianceReport {
    pub fn unknown(issue: &str) -> Self {
        Self {
            status: ComplianceStatus::Unknown,
            issues: vec![issue.to_string()],
            ..Self::default()
        }
    }

    pub fn warning(issue: String) -> Self {
        Self {
            status: ComplianceStatus::Warning,
            issues: vec![issue],
            ..Self::default()
        }
    }
}
