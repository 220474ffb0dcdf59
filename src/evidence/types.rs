use serde::{Deserialize, Serialize};

/// A table lifted out of an HTML fragment: header cells plus data rows.
/// Cells stay positionally aligned with the headers; short rows are padded
/// by lookup, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Index of the first header containing any of the keywords.
    pub fn column(&self, keywords: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| keywords.iter().any(|k| h.contains(k)))
    }
}

/// One inspection requirement distilled from evidence, with provenance of
/// the snippet it came from. Rebuilt on every verification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredItem {
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_basis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_chunk_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_doc: Option<String>,
}

impl RequiredItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            item_name: name.into(),
            ..Self::default()
        }
    }
}
