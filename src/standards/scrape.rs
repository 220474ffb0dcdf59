//! Marker-anchored extraction from registry search and detail pages.
//!
//! The registry renders to messy markdown or tag soup depending on the
//! extraction path, so every field is found the same way: locate a Chinese
//! anchor phrase, then scan a bounded window after it for the first
//! `YYYY-MM-DD`. Status additionally reads the registry's gif markers, which
//! survive markdown conversion as image URLs.

use lazy_static::lazy_static;
use regex::Regex;

use super::types::StandardStatus;

lazy_static! {
    static ref YMD: Regex = Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid ymd regex");
    static ref DETAIL_URL: Regex =
        Regex::new(r"https?://down\.foodmate\.net/standard/sort/\d+/\d+\.html")
            .expect("valid detail-url regex");
    static ref GB_ANCHOR: Regex = Regex::new(r"GB\s*\d+-\d{4}").expect("valid gb-anchor regex");
}

const DATE_WINDOW: usize = 500;
const ABOLISH_WINDOW: usize = 300;
const GB_FALLBACK_WINDOW: usize = 1200;
const STATUS_WINDOW: usize = 400;

/// Registry gif shown next to standards that are still in force.
const CURRENT_GIF: &str = "xxyx.gif";
/// Registry gif shown next to abolished standards.
const ABOLISHED_GIF: &str = "yjfz.gif";

/// Byte offset clamped to a char boundary, scanning backwards.
fn floor_boundary(text: &str, mut at: usize) -> usize {
    at = at.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fn ceil_boundary(text: &str, mut at: usize) -> usize {
    at = at.min(text.len());
    while at < text.len() && !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

fn window_after<'a>(text: &'a str, anchor: &str, window: usize) -> Option<&'a str> {
    let start = text.find(anchor)?;
    let end = ceil_boundary(text, start + anchor.len() + window);
    Some(&text[start..end])
}

fn first_ymd(text: &str) -> Option<String> {
    YMD.find(text).map(|m| m.as_str().to_string())
}

/// Publish and implement dates from a search-results page. Anchored scans
/// first; when either is still missing, a window after the first GB
/// designator supplies them positionally (first date publishes, second
/// implements).
pub fn extract_dates_from_search_page(text: &str) -> (Option<String>, Option<String>) {
    let mut publish = window_after(text, "发布日期", DATE_WINDOW).and_then(first_ymd);
    let mut implement = window_after(text, "实施日期", DATE_WINDOW).and_then(first_ymd);

    if publish.is_none() || implement.is_none() {
        if let Some(m) = GB_ANCHOR.find(text) {
            let end = ceil_boundary(text, m.start() + GB_FALLBACK_WINDOW);
            let window = &text[m.start()..end];
            let dates: Vec<&str> = YMD.find_iter(window).map(|d| d.as_str()).collect();
            if let Some(first) = dates.first() {
                publish = publish.or_else(|| Some(first.to_string()));
            }
            if let Some(second) = dates.get(1) {
                implement = implement.or_else(|| Some(second.to_string()));
            }
        }
    }

    (publish, implement)
}

/// First detail-page URL found in a search-results page.
pub fn extract_detail_url(text: &str) -> Option<String> {
    DETAIL_URL.find(text).map(|m| m.as_str().to_string())
}

/// Status read from the window around the GB number's occurrence: gif
/// markers first, then status phrases.
pub fn extract_status_near(text: &str, gb_number: &str) -> Option<StandardStatus> {
    let anchored = format!("GB {gb_number}");
    let idx = text.find(&anchored).or_else(|| text.find(gb_number))?;

    let start = floor_boundary(text, idx.saturating_sub(STATUS_WINDOW));
    let end = ceil_boundary(text, idx + STATUS_WINDOW);
    let window = &text[start..end];

    if window.contains(ABOLISHED_GIF) {
        return Some(StandardStatus::Abolished);
    }
    if window.contains(CURRENT_GIF) {
        return Some(StandardStatus::Current);
    }
    for phrase in ["状态：现行", "状态:现行", "现行有效"] {
        if window.contains(phrase) {
            return Some(StandardStatus::Current);
        }
    }
    for phrase in ["状态：废止", "状态:废止", "已废止", "状态：作废", "状态:作废"] {
        if window.contains(phrase) {
            return Some(StandardStatus::Abolished);
        }
    }
    if window.contains("即将实施") {
        return Some(StandardStatus::Pending);
    }
    None
}

/// Status read from anywhere in a blob, by gif marker only. Last-resort
/// fallback when the GB number itself never appears in the rendered text.
pub fn extract_status_anywhere(text: &str) -> Option<StandardStatus> {
    if text.contains(CURRENT_GIF) {
        return Some(StandardStatus::Current);
    }
    if text.contains(ABOLISHED_GIF) {
        return Some(StandardStatus::Abolished);
    }
    None
}

/// Abolish date from a detail page. 暂无 carries no date and falls out as
/// `None` naturally.
pub fn extract_abolish_date(text: &str) -> Option<String> {
    for anchor in ["废止日期", "作废日期", "停止实施日期", "废止时间"] {
        if let Some(window) = window_after(text, anchor, ABOLISH_WINDOW) {
            if let Some(date) = first_ymd(window) {
                return Some(date);
            }
        }
    }
    None
}

/// Publish/implement dates from a detail page share the search-page anchors.
pub fn extract_dates_from_detail_page(text: &str) -> (Option<String>, Option<String>) {
    let publish = window_after(text, "发布日期", DATE_WINDOW).and_then(first_ymd);
    let implement = window_after(text, "实施日期", DATE_WINDOW).and_then(first_ymd);
    (publish, implement)
}

/// Status from a detail page: the section between the 标准状态 and 实施日期
/// anchors, gif markers first, phrases second.
pub fn extract_status_from_detail_page(text: &str) -> Option<StandardStatus> {
    let start = text.find("标准状态")?;
    let end = text[start..]
        .find("实施日期")
        .map(|rel| start + rel)
        .unwrap_or_else(|| ceil_boundary(text, start + STATUS_WINDOW));
    let section = &text[start..end];

    if section.contains(ABOLISHED_GIF) {
        return Some(StandardStatus::Abolished);
    }
    if section.contains(CURRENT_GIF) {
        return Some(StandardStatus::Current);
    }
    let status = StandardStatus::from_phrase(section);
    (status != StandardStatus::Unknown).then_some(status)
}
