use serde::{Deserialize, Serialize};

use super::validate::ValidationResult;

/// Legal status of a standard as published by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardStatus {
    /// 现行有效.
    Current,
    /// 已废止 / 作废 / 停止实施.
    Abolished,
    /// 即将实施.
    Pending,
    /// Registry gave no readable status. Treated as not in force.
    #[default]
    Unknown,
}

impl StandardStatus {
    /// Maps a registry status phrase. Abolition markers dominate, matching
    /// the conservative reading the registry pages call for.
    pub fn from_phrase(phrase: &str) -> Self {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Self::Unknown;
        }
        if phrase.contains("废止") || phrase.contains("作废") || phrase.contains("停止") {
            return Self::Abolished;
        }
        if phrase.contains("即将实施") {
            return Self::Pending;
        }
        if (phrase.contains("现行") && phrase.contains("有效")) || phrase == "有效" {
            return Self::Current;
        }
        Self::Unknown
    }

    pub fn is_current(self) -> bool {
        matches!(self, Self::Current)
    }

    /// Registry-facing phrase, for reasons and logs.
    pub fn phrase(self) -> &'static str {
        match self {
            Self::Current => "现行有效",
            Self::Abolished => "已废止",
            Self::Pending => "即将实施",
            Self::Unknown => "未知",
        }
    }
}

/// Registry facts about one standard, as scraped from the search and detail
/// pages. Dates stay raw strings here; parsing happens during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gb_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implement_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abolish_date: Option<String>,
    pub status: StandardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

/// Outcome class for one verified code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// In force on the production date.
    Passed,
    /// Registry facts known, validity rule failed.
    Failed,
    /// Lookup failed for this code only.
    Error,
    /// No registry configured.
    Unknown,
}

/// Verification outcome for one standard code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeVerification {
    pub code: String,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<StandardInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl CodeVerification {
    pub fn unknown(code: &str, reason: &str) -> Self {
        Self {
            code: code.to_string(),
            status: VerificationStatus::Unknown,
            reasons: vec![reason.to_string()],
            info: None,
            validation: None,
        }
    }

    pub fn error(code: &str, reason: String) -> Self {
        Self {
            code: code.to_string(),
            status: VerificationStatus::Error,
            reasons: vec![reason],
            info: None,
            validation: None,
        }
    }
}
