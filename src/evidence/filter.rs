//! Distills required inspection items from a parsed evidence table.
//!
//! Requirement tables mix real substance names with remarks, section labels,
//! numbering fragments and merged multi-substance cells. Candidate names run
//! through an ordered rejection cascade (the rules are data, not branching),
//! then merged cells are split into per-substance items with their method
//! codes redistributed.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ParsedTable, RequiredItem};

const NAME_COLUMNS: &[&str] = &["检验项目", "项目名称", "项目"];
const BASIS_COLUMNS: &[&str] = &["依据法律法规", "检验依据"];
const METHOD_COLUMNS: &[&str] = &["检测方法", "检验方法"];

/// Table noise that is never a substance name.
const STOPWORDS: &[&str] = &[
    "注", "备注", "说明", "▲", "★", "类别", "分类", "序号", "检测项目", "无",
    "见下表", "如", "同", "及", "等", "目录", "页码", "页", "表", "附录",
    "参考", "依据", "标准", "方法", "单位", "限量", "指标", "共", "第", "见",
    "参见", "详见", "参照", "补充", "额外", "蔬菜",
];

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 50;

lazy_static! {
    static ref NUMBERING_ONLY: Regex = Regex::new(r"^[\d.)、]+$").expect("valid numbering regex");
    /// Method/basis standard designators (GB, NY, SN, GH families).
    static ref STANDARD_CODE: Regex =
        Regex::new(r"(?:GB|NY|SN|GH)(?:/T)?\s*\d+(?:\.\d+)*(?:-\d{4})?")
            .expect("valid code regex");
    static ref REMARK_FRAGMENT: Regex =
        Regex::new(r"不检测|不适用|视产品|而定|以.*为主要原料|^[a-z][.、]$")
            .expect("valid remark regex");
}

/// Extracts required items from an evidence table. Returns an empty vec when
/// the table has no recognizable item-name column.
pub fn find_inspection_items(table: &ParsedTable) -> Vec<RequiredItem> {
    let Some(name_col) = table.column(NAME_COLUMNS) else {
        return Vec::new();
    };
    let basis_col = table.column(BASIS_COLUMNS);
    let method_col = table.column(METHOD_COLUMNS);

    let mut items = Vec::new();
    for row in &table.rows {
        let Some(name) = row.get(name_col).map(|c| c.trim()) else {
            continue;
        };
        if !is_valid_item_name(name) {
            continue;
        }
        let basis = basis_col
            .and_then(|c| row.get(c))
            .map(|c| dedupe_tokens(c))
            .filter(|b| !b.is_empty());
        let method = method_col
            .and_then(|c| row.get(c))
            .map(|c| c.trim().to_string())
            .filter(|m| !m.is_empty());

        items.extend(split_merged_item(name, basis, method));
    }
    items
}

/// Ordered rejection cascade for a candidate item name.
pub fn is_valid_item_name(name: &str) -> bool {
    let name = name.trim();
    let len = name.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) {
        return false;
    }
    // Containment, not equality: category cells and remark fragments embed
    // the noise tokens ("叶菜类蔬菜", "铅镉见下表").
    if STOPWORDS.iter().any(|kw| name.contains(kw)) {
        return false;
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if len == 1 && name.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if NUMBERING_ONLY.is_match(name) {
        return false;
    }
    if !name.chars().any(|c| is_cjk(c) || c.is_alphanumeric()) {
        return false;
    }
    let cjk_count = name.chars().filter(|c| is_cjk(*c)).count();
    if cjk_count < 2 {
        // Acronym exception: all-uppercase ASCII of length 2..=10.
        let ascii_upper = name.chars().all(|c| c.is_ascii_uppercase());
        return ascii_upper && (2..=10).contains(&len);
    }
    true
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Removes duplicate whitespace-separated tokens, preserving first-seen
/// order. Basis cells repeat the same GB citation per merged substance.
fn dedupe_tokens(cell: &str) -> String {
    let mut seen = std::collections::HashSet::new();
    cell.split_whitespace()
        .filter(|t| seen.insert(t.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a merged multi-substance cell into one item per substance.
///
/// The name is tokenized on whitespace; junk fragments (unbalanced bracket
/// remnants, sub-2-char leftovers, pure digits, remark phrases) are dropped.
/// With fewer than two surviving fragments the cell stays a single item.
/// Method codes are redistributed evenly across fragments when there are at
/// least as many codes as fragments (the last fragment takes the remainder),
/// otherwise every fragment shares the original method cell; the basis is
/// assigned 1:1 only when its token count matches exactly.
fn split_merged_item(
    name: &str,
    basis: Option<String>,
    method: Option<String>,
) -> Vec<RequiredItem> {
    let fragments: Vec<&str> = name
        .split_whitespace()
        .filter(|f| is_valid_fragment(f))
        .collect();

    if fragments.len() < 2 {
        return vec![RequiredItem {
            item_name: name.to_string(),
            standard_basis: basis,
            test_method: method,
            ..RequiredItem::default()
        }];
    }

    let codes: Vec<String> = method
        .as_deref()
        .map(|m| {
            STANDARD_CODE
                .find_iter(m)
                .map(|c| c.as_str().trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    let basis_tokens: Vec<&str> = basis
        .as_deref()
        .map(|b| b.split_whitespace().collect())
        .unwrap_or_default();
    let basis_one_to_one = basis_tokens.len() == fragments.len();

    let per_fragment = if codes.len() >= fragments.len() {
        codes.len() / fragments.len()
    } else {
        0
    };

    fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| {
            let test_method = if per_fragment > 0 {
                let start = i * per_fragment;
                let end = if i + 1 == fragments.len() {
                    codes.len()
                } else {
                    start + per_fragment
                };
                Some(codes[start..end].join(" "))
            } else {
                method.clone()
            };
            let standard_basis = if basis_one_to_one {
                Some(basis_tokens[i].to_string())
            } else {
                basis.clone()
            };
            RequiredItem {
                item_name: fragment.to_string(),
                standard_basis,
                test_method,
                ..RequiredItem::default()
            }
        })
        .collect()
}

fn is_valid_fragment(fragment: &str) -> bool {
    if brackets_unbalanced(fragment) {
        return false;
    }
    let stripped: String = fragment
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '（' | '）' | '[' | ']' | '《' | '》'))
        .collect();
    if stripped.chars().count() < 2 {
        return false;
    }
    if stripped.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if REMARK_FRAGMENT.is_match(fragment) {
        return false;
    }
    true
}

fn brackets_unbalanced(fragment: &str) -> bool {
    let opens = fragment.chars().filter(|c| matches!(c, '(' | '（')).count();
    let closes = fragment.chars().filter(|c| matches!(c, ')' | '）')).count();
    opens != closes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> ParsedTable {
        ParsedTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn extracts_rows_with_basis_and_method() {
        let t = table(
            &["序号", "检验项目", "依据法律法规(或标准)", "检测方法"],
            &[
                &["1", "甲拌磷", "GB 2763", "GB 23200.8-2016"],
                &["2", "备注", "GB 2763", ""],
            ],
        );
        let items = find_inspection_items(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_name, "甲拌磷");
        assert_eq!(items[0].standard_basis.as_deref(), Some("GB 2763"));
        assert_eq!(items[0].test_method.as_deref(), Some("GB 23200.8-2016"));
    }

    #[test]
    fn no_name_column_yields_nothing() {
        let t = table(&["类别", "数量"], &[&["蔬菜", "3"]]);
        assert!(find_inspection_items(&t).is_empty());
    }

    #[test]
    fn name_length_band_boundaries() {
        let fifty = "菌".repeat(50);
        let fifty_one = "菌".repeat(51);
        assert!(is_valid_item_name(&fifty));
        assert!(!is_valid_item_name(&fifty_one));
        assert!(!is_valid_item_name("铅"));
        assert!(is_valid_item_name("铅镉"));
    }

    #[test]
    fn rejects_noise_names() {
        for noise in ["备注", "见下表", "123", "1.2、", "▲", "——", "a"] {
            assert!(!is_valid_item_name(noise), "{noise} should be rejected");
        }
    }

    #[test]
    fn rejects_names_containing_stopwords() {
        for noise in ["叶菜类蔬菜", "铅镉见下表", "检出限量值", "备注栏"] {
            assert!(!is_valid_item_name(noise), "{noise} should be rejected");
        }
        assert!(is_valid_item_name("多菌灵"));
    }

    #[test]
    fn category_and_remark_rows_never_become_items() {
        let t = table(
            &["检验项目"],
            &[&["叶菜类蔬菜"], &["铅镉见下表"], &["毒死蜱"]],
        );
        let items = find_inspection_items(&t);
        let names: Vec<&str> = items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["毒死蜱"]);
    }

    #[test]
    fn acronym_exception_for_uppercase_ascii() {
        assert!(is_valid_item_name("DDT"));
        assert!(is_valid_item_name("BHC"));
        assert!(!is_valid_item_name("ddt"));
        assert!(!is_valid_item_name("ABCDEFGHIJK"));
    }

    #[test]
    fn basis_tokens_deduplicated_in_order() {
        let t = table(
            &["检验项目", "检验依据"],
            &[&["毒死蜱", "GB2763 GB2763 GB31650"]],
        );
        let items = find_inspection_items(&t);
        assert_eq!(items[0].standard_basis.as_deref(), Some("GB2763 GB31650"));
    }

    #[test]
    fn merged_names_split_with_method_distribution() {
        let t = table(
            &["检验项目", "检测方法"],
            &[&["甲拌磷 克百威", "GB 23200.8-2016 GB 23200.112-2018"]],
        );
        let items = find_inspection_items(&t);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_name, "甲拌磷");
        assert_eq!(items[0].test_method.as_deref(), Some("GB 23200.8-2016"));
        assert_eq!(items[1].item_name, "克百威");
        assert_eq!(items[1].test_method.as_deref(), Some("GB 23200.112-2018"));
    }

    #[test]
    fn last_fragment_takes_remainder_codes() {
        let t = table(
            &["检验项目", "检测方法"],
            &[&["氧乐果 水胺硫磷", "GB 23200.8 GB 23200.112 GB 23200.121"]],
        );
        let items = find_inspection_items(&t);
        assert_eq!(items[0].test_method.as_deref(), Some("GB 23200.8"));
        assert_eq!(
            items[1].test_method.as_deref(),
            Some("GB 23200.112 GB 23200.121")
        );
    }

    #[test]
    fn fewer_codes_than_fragments_shares_method() {
        let t = table(
            &["检验项目", "检测方法"],
            &[&["氧乐果 水胺硫磷", "GB 23200.8-2016"]],
        );
        let items = find_inspection_items(&t);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].test_method.as_deref(), Some("GB 23200.8-2016"));
        assert_eq!(items[1].test_method.as_deref(), Some("GB 23200.8-2016"));
    }

    #[test]
    fn remark_fragments_are_discarded() {
        let t = table(
            &["检验项目", "检测方法"],
            &[&["甲拌磷 不检测 (以鲜重计 克百威", "GB 23200.8 GB 23200.112"]],
        );
        let items = find_inspection_items(&t);
        let names: Vec<&str> = items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["甲拌磷", "克百威"]);
    }

    #[test]
    fn idempotent_over_identical_input() {
        let t = table(
            &["检验项目", "检验依据", "检测方法"],
            &[&["甲拌磷 克百威", "GB2763 GB2763", "GB 23200.8 GB 23200.112"]],
        );
        let a = find_inspection_items(&t);
        let b = find_inspection_items(&t);
        assert_eq!(a, b);
    }
}
