//! Inspection-item name normalization and fuzzy matching.
//!
//! OCR and table extraction routinely merge adjacent substance names into one
//! cell ("阿维菌素哒螨灵") or append parenthetical qualifiers
//! ("甲拌磷（甲拌磷及其氧类似物之和，以甲拌磷表示）"). Exact string equality
//! would miss most real matches, so matching escalates through three tiers:
//! normalized equality, substring containment, and sub-name extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Separators that join merged substance names, in priority order.
/// The first separator that splits the text into more than one non-empty
/// part wins.
const NAME_SEPARATORS: &[char] = &['和', '、', '/', '，', ',', ' '];

/// Common chemical-name suffixes (pesticides, veterinary drugs). A name
/// containing two or more of these is likely a merged multi-substance cell.
const CHEMICAL_SUFFIXES: &[&str] = &["菌素", "灵", "磷", "威", "酯", "醇", "胺", "酮"];

/// Normalized names at or below this many characters are treated as atomic
/// substance names and never split.
const ATOMIC_NAME_LEN: usize = 6;

lazy_static! {
    static ref YEAR_SUFFIX: Regex = Regex::new(r"-\d{4}").expect("valid year-suffix regex");
}

/// Normalizes an item name: cuts at the first open paren (ASCII or
/// full-width) and removes all internal whitespace.
///
/// `"甲拌磷（甲拌磷及其氧类似物之和）"` becomes `"甲拌磷"`.
pub fn normalize(name: &str) -> String {
    let main = match name.find(['(', '（']) {
        Some(pos) => &name[..pos],
        None => name,
    };
    main.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Extracts the candidate substance names contained in `text`.
///
/// Short normalized names are returned as-is. Longer names are split on the
/// common separators; when no separator is present, a suffix-count heuristic
/// segments names that merged without any delimiter at all
/// (`"阿维菌素哒螨灵"` yields `["阿维菌素", "哒螨灵"]`).
pub fn extract_names(text: &str) -> Vec<String> {
    let text = normalize(text);
    if text.is_empty() {
        return Vec::new();
    }

    if text.chars().count() <= ATOMIC_NAME_LEN {
        return vec![text];
    }

    for sep in NAME_SEPARATORS {
        if text.contains(*sep) {
            let parts: Vec<String> = text
                .split(*sep)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if parts.len() > 1 {
                return parts;
            }
        }
    }

    if let Some(parts) = split_by_suffixes(&text) {
        return parts;
    }

    vec![text]
}

/// Segments a merged name at repeated chemical-suffix boundaries. Returns
/// `None` unless at least two distinct suffixes are present and some suffix
/// repeats, which keeps single-substance names like "克百威" intact.
fn split_by_suffixes(text: &str) -> Option<Vec<String>> {
    let suffix_kinds = CHEMICAL_SUFFIXES
        .iter()
        .filter(|s| text.contains(**s))
        .count();
    if suffix_kinds < 2 {
        return None;
    }

    for suffix in CHEMICAL_SUFFIXES {
        if text.matches(*suffix).count() < 2 {
            continue;
        }
        let mut parts = Vec::new();
        let mut last = 0;
        for (pos, m) in text.match_indices(*suffix) {
            let end = pos + m.len();
            let piece = text[last..end].trim();
            if !piece.is_empty() {
                parts.push(piece.to_string());
            }
            last = end;
        }
        if parts.len() > 1 {
            return Some(parts);
        }
    }
    None
}

/// Fuzzy equality between a report item name and a required item name.
///
/// True when the normalized forms are equal, when one contains the other,
/// or when any extracted sub-name of one relates (equal/substring) to any
/// extracted sub-name of the other.
pub fn fuzzy_match(report_name: &str, required_name: &str) -> bool {
    let report = normalize(report_name);
    let required = normalize(required_name);
    if report.is_empty() || required.is_empty() {
        return false;
    }

    if related(&report, &required) {
        return true;
    }

    let report_parts = extract_names(&report);
    let required_parts = extract_names(&required);
    for rp in &report_parts {
        for qp in &required_parts {
            if related(&normalize(rp), &normalize(qp)) {
                return true;
            }
        }
    }

    false
}

fn related(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a == b || a.contains(b) || b.contains(a))
}

/// Fuzzy equality between two standard-code strings (test methods, basis
/// citations). Year suffixes and whitespace are irrelevant for identity:
/// "GB 23200.8-2016" and "GB23200.8" designate the same method.
pub fn fuzzy_match_code(report_code: &str, required_code: &str) -> bool {
    let a = clean_code(report_code);
    let b = clean_code(required_code);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn clean_code(code: &str) -> String {
    YEAR_SUFFIX
        .replace_all(code, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
