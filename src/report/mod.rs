//! Report document model and keyword-anchored field extraction.
//!
//! The OCR/table front end (external to this crate) produces a normalized
//! page structure: plain text lines plus row-major tables per page. This
//! module pulls the structured fields out of that noise. Absence is always
//! representable — extractors return `None` or an empty list, never an
//! error.

pub mod extractor;

use serde::{Deserialize, Serialize};

/// A table as delivered by the extraction front end: rows of cell strings,
/// first row conventionally the header.
pub type Table = Vec<Vec<String>>;

/// One page of an ingested report document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Free text lines in reading order.
    #[serde(default)]
    pub text_lines: Vec<String>,

    /// Tables detected on the page.
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// A whole ingested report document (one uploaded PDF).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    /// Iterates over non-empty, trimmed text lines across all pages.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.text_lines.iter())
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
    }

    /// Iterates over non-empty tables across all pages.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.pages
            .iter()
            .flat_map(|p| p.tables.iter())
            .filter(|t| !t.is_empty())
    }
}

/// A cited standard code together with the document title found next to it,
/// e.g. `GB 2763-2021` / 《食品安全国家标准 食品中农药最大残留限量》.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardRef {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One itemized test row from the report's result table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

/// The structured record extracted from one report document. Built once per
/// upload and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    pub standard_codes: Vec<String>,
    pub standard_refs: Vec<StandardRef>,
    pub items: Vec<InspectionItem>,
}
