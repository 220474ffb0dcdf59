//! Keyword-anchored field extraction over the normalized page structure.
//!
//! Every field is searched in two passes — free text lines first, table
//! headers/cells as fallback — because scanned reports carry the same field
//! in either place depending on layout. Dates get a third "first pattern
//! anywhere" fallback. GB codes are context-gated to conclusion sentences so
//! that method-reference codes in unrelated table columns are not picked up.

use lazy_static::lazy_static;
use regex::Regex;

use super::{Document, InspectionItem, Report, StandardRef, Table};

const DATE_KEYWORDS: &[&str] = &["生产日期", "生产/加工日期", "生产/包装日期", "生产检验日期"];
const NAME_KEYWORDS: &[&str] = &["样品名称", "食品名称", "产品名称"];
const CONCLUSION_KEYWORDS: &[&str] = &["检验结论", "结论", "判定"];

/// Conclusion sentences introduce the list of standards the verdict was
/// judged against; GB codes elsewhere are method references.
const SAMPLING_PHRASE: &str = "经抽样检验";

lazy_static! {
    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\d{4}[年\-/.]\d{1,2}[月\-/.]\d{1,2}日?").expect("valid date regex"),
        Regex::new(r"\d{4}-\d{1,2}-\d{1,2}").expect("valid date regex"),
    ];
    static ref CONCLUSION_REGEX: Regex =
        Regex::new(r"(合格|不合格|基本符合|符合[^。；;\n]*要求|不符合[^。；;\n]*要求|未检出)")
            .expect("valid conclusion regex");
    /// GB or GB/T code with any of the dash variants OCR produces.
    static ref GB_CODE: Regex =
        Regex::new(r"GB(?:/T)?\s*\d+(?:\.\d+)?\s*[—\-‑–－]\s*\d{4}").expect("valid GB regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
    static ref BOOK_TITLE: Regex = Regex::new(r"《([^》]+)》").expect("valid title regex");
    static ref SENTENCE_END: Regex = Regex::new(r"[。；;]").expect("valid sentence regex");
    static ref TRAILING_REQUIREMENT: Regex = Regex::new(r"的*要求$").expect("valid suffix regex");
}

/// Runs all field extractors over one document.
pub fn extract(doc: &Document) -> Report {
    Report {
        food_name: extract_food_name(doc),
        production_date: extract_production_date(doc),
        conclusion: extract_conclusion(doc),
        standard_codes: extract_standard_codes(doc),
        standard_refs: extract_standard_refs(doc),
        items: extract_items(doc),
    }
}

fn first_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|p| p.find(text))
        .map(|m| m.as_str().to_string())
}

/// Extracts the production date: keyword-anchored lines, then keyword-mapped
/// table columns, then the first date pattern anywhere.
pub fn extract_production_date(doc: &Document) -> Option<String> {
    for line in doc.text_lines() {
        if DATE_KEYWORDS.iter().any(|k| line.contains(k)) {
            if let Some(value) = first_date(line) {
                return Some(value);
            }
        }
    }

    for table in doc.tables() {
        if let Some(col) = header_column(table, DATE_KEYWORDS) {
            for row in table.iter().skip(1) {
                if let Some(cell) = row.get(col) {
                    if let Some(value) = first_date(cell) {
                        return Some(value);
                    }
                }
            }
        }
    }

    doc.text_lines().find_map(first_date)
}

/// Extracts the food/sample name. In text lines the value is whatever
/// follows the keyword's colon; without a colon, the token directly after
/// the keyword.
pub fn extract_food_name(doc: &Document) -> Option<String> {
    for line in doc.text_lines() {
        for kw in NAME_KEYWORDS {
            if !line.contains(kw) {
                continue;
            }
            if let Some(pos) = line.find(['：', ':']) {
                let value = line[pos..].trim_start_matches(['：', ':']).trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
            let after_kw = Regex::new(&format!(r"{}\s*([^：:\s]+)", regex::escape(kw)))
                .expect("valid keyword regex");
            if let Some(caps) = after_kw.captures(line) {
                return Some(caps[1].trim().to_string());
            }
        }
    }

    for table in doc.tables() {
        if let Some(col) = header_column(table, NAME_KEYWORDS) {
            for row in table.iter().skip(1) {
                if let Some(cell) = row.get(col) {
                    let cell = cell.trim();
                    if !cell.is_empty() {
                        return Some(cell.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Extracts the overall inspection verdict (合格 / 不合格 / 符合…要求 etc.).
pub fn extract_conclusion(doc: &Document) -> Option<String> {
    for line in doc.text_lines() {
        if CONCLUSION_KEYWORDS.iter().any(|k| line.contains(k)) {
            if let Some(m) = CONCLUSION_REGEX.find(line) {
                return Some(m.as_str().to_string());
            }
        }
    }

    for table in doc.tables() {
        if let Some(col) = header_column(table, CONCLUSION_KEYWORDS) {
            for row in table.iter().skip(1) {
                if let Some(cell) = row.get(col) {
                    let cell = cell.trim();
                    if !cell.is_empty() {
                        return Some(cell.to_string());
                    }
                }
            }
        }
    }

    doc.text_lines()
        .find_map(|line| CONCLUSION_REGEX.find(line).map(|m| m.as_str().to_string()))
}

fn conclusion_context(text: &str) -> bool {
    text.contains("GB")
        && (CONCLUSION_KEYWORDS.iter().any(|k| text.contains(k))
            || text.contains(SAMPLING_PHRASE))
}

/// Extracts cited GB standard codes, deduplicated in first-seen order.
/// Only conclusion-context lines/rows are scanned (§ context gating).
pub fn extract_standard_codes(doc: &Document) -> Vec<String> {
    let mut codes = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let mut add_from = |text: &str| {
        // Collapse whitespace first: OCR splits codes across line breaks.
        let normalized = WHITESPACE.replace_all(text, " ");
        for m in GB_CODE.find_iter(&normalized) {
            let code = m.as_str().trim().to_string();
            if seen.insert(code.clone()) {
                codes.push(code);
            }
        }
    };

    for line in doc.text_lines() {
        if conclusion_context(line) {
            add_from(line);
        }
    }

    for table in doc.tables() {
        for row in table {
            let row_text = row.join(" ");
            if conclusion_context(&row_text) {
                add_from(&row_text);
            }
        }
    }

    codes
}

/// Extracts GB codes together with their document titles. A directly
/// following 《…》 bracket is preferred; otherwise the text up to the next
/// sentence-ending punctuation, with trailing 的要求/要求 stripped. One entry
/// per code, first occurrence wins.
pub fn extract_standard_refs(doc: &Document) -> Vec<StandardRef> {
    let mut refs: Vec<StandardRef> = Vec::new();
    let mut used = std::collections::HashSet::new();

    let mut add_from = |text: &str| {
        let normalized = WHITESPACE.replace_all(text, " ");
        for m in GB_CODE.find_iter(&normalized) {
            let code = m.as_str().trim().to_string();
            if used.contains(&code) {
                continue;
            }
            let tail = &normalized[m.end()..];

            let raw_title = match BOOK_TITLE.captures(tail) {
                Some(caps) if caps.get(0).map(|g| g.start()) == Some(0) => {
                    caps[1].to_string()
                }
                _ => match SENTENCE_END.find(tail) {
                    Some(end) => tail[..end.start()].to_string(),
                    None => tail.to_string(),
                },
            };

            let title = raw_title
                .trim()
                .trim_matches([' ', '，', ',', '《', '》', '[', ']', '（', '）', '(', ')']);
            let title = TRAILING_REQUIREMENT.replace(title, "").trim().to_string();

            used.insert(code.clone());
            refs.push(StandardRef {
                code,
                title: (!title.is_empty()).then_some(title),
            });
        }
    };

    for line in doc.text_lines() {
        if conclusion_context(line) {
            add_from(line);
        }
    }
    for table in doc.tables() {
        for row in table {
            let row_text = row.join(" ");
            if conclusion_context(&row_text) {
                add_from(&row_text);
            }
        }
    }

    refs
}

#[derive(Default)]
struct ColumnMap {
    index: Option<usize>,
    item: Option<usize>,
    unit: Option<usize>,
    standard: Option<usize>,
    value: Option<usize>,
    conclusion: Option<usize>,
    method: Option<usize>,
}

fn map_columns(header: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    let assign = |slot: &mut Option<usize>, idx: usize| {
        if slot.is_none() {
            *slot = Some(idx);
        }
    };
    for (idx, raw) in header.iter().enumerate() {
        let name = raw.trim();
        if name.contains("序号") {
            assign(&mut map.index, idx);
        }
        if ["检验项目", "项目名称", "项目"].iter().any(|k| name.contains(k)) {
            assign(&mut map.item, idx);
        }
        if ["计量单位", "单位"].iter().any(|k| name.contains(k)) {
            assign(&mut map.unit, idx);
        }
        if ["标准指标", "标准要求", "限量", "标准值"].iter().any(|k| name.contains(k)) {
            assign(&mut map.standard, idx);
        }
        if ["实测值", "检验结果", "测定值", "结果"].iter().any(|k| name.contains(k)) {
            assign(&mut map.value, idx);
        }
        if ["单项判定", "判定", "结论"].iter().any(|k| name.contains(k)) {
            assign(&mut map.conclusion, idx);
        }
        if ["检验方法", "检测方法", "方法", "检验依据", "依据"]
            .iter()
            .any(|k| name.contains(k))
        {
            assign(&mut map.method, idx);
        }
    }
    map
}

fn cell(row: &[String], col: Option<usize>) -> Option<String> {
    let value = row.get(col?)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Extracts itemized test rows from the first table whose header maps both
/// an item-name and a measured-value column and that yields any rows.
/// Reports are assumed to carry a single table of interest, so processing
/// stops at the first hit.
pub fn extract_items(doc: &Document) -> Vec<InspectionItem> {
    for table in doc.tables() {
        let items = items_from_table(table);
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

fn items_from_table(table: &Table) -> Vec<InspectionItem> {
    let Some(header) = table.first() else {
        return Vec::new();
    };
    let map = map_columns(header);
    if map.item.is_none() || map.value.is_none() {
        return Vec::new();
    }

    let mut items = Vec::new();
    for row in table.iter().skip(1) {
        let item = InspectionItem {
            index: cell(row, map.index),
            name: cell(row, map.item),
            unit: cell(row, map.unit),
            standard_limit: cell(row, map.standard),
            measured_value: cell(row, map.value),
            method: cell(row, map.method),
            conclusion: cell(row, map.conclusion),
        };
        if item.name.is_some() || item.measured_value.is_some() || item.standard_limit.is_some() {
            items.push(item);
        }
    }
    items
}

fn header_column(table: &Table, keywords: &[&str]) -> Option<usize> {
    table
        .first()?
        .iter()
        .position(|col| keywords.iter().any(|k| col.contains(k)))
}
