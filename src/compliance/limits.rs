//! Limit-indicator arithmetic: food-category aliases, limit extraction from
//! requirement text, and report-value parsing.

use lazy_static::lazy_static;
use regex::Regex;

/// Produce names mapped to the category row used by the residue-limit
/// tables. Matching tries the specific name first, then the category.
const FOOD_CATEGORIES: &[(&str, &str)] = &[
    ("黄瓜", "瓜类蔬菜"),
    ("冬瓜", "瓜类蔬菜"),
    ("苦瓜", "瓜类蔬菜"),
    ("南瓜", "瓜类蔬菜"),
    ("丝瓜", "瓜类蔬菜"),
    ("佛手瓜", "瓜类蔬菜"),
    ("茄子", "茄果类蔬菜"),
    ("番茄", "茄果类蔬菜"),
    ("辣椒", "茄果类蔬菜"),
    ("白菜", "叶菜类蔬菜"),
    ("菠菜", "叶菜类蔬菜"),
    ("生菜", "叶菜类蔬菜"),
    ("油菜", "叶菜类蔬菜"),
    ("芥菜", "叶菜类蔬菜"),
    ("豆角", "豆类蔬菜"),
    ("豌豆", "豆类蔬菜"),
    ("萝卜", "根茎类和薯芋类蔬菜"),
    ("胡萝卜", "根茎类和薯芋类蔬菜"),
    ("土豆", "根茎类和薯芋类蔬菜"),
];

lazy_static! {
    static ref LIMIT_VALUE: Regex =
        Regex::new(r"([\u{2264}≤<]?\s*\d+\.?\d*)\s*(mg/kg|ppm|%|μg/kg|mg/L)?")
            .expect("valid limit-value regex");
    static ref UNIT_NUMBER: Regex =
        Regex::new(r"(\d+\.?\d*)\s*(mg/kg|ppm|%|μg/kg)").expect("valid unit-number regex");
    static ref MAX_LIMIT: Regex = Regex::new(r"(?:≤|<=|<)([\d.]+)").expect("valid max-limit regex");
    static ref FIRST_NUMBER: Regex = Regex::new(r"([\d.]+)").expect("valid number regex");
}

/// Candidate row names for a food, specific name first.
pub fn food_categories(food_name: &str) -> Vec<String> {
    let mut names = vec![food_name.to_string()];
    if let Some((_, category)) = FOOD_CATEGORIES.iter().find(|(f, _)| *f == food_name) {
        names.push(category.to_string());
    }
    names
}

/// Extracts the limit value applying to `food_name` from requirement text,
/// for display. The line naming the food (or its category) wins; without
/// one, the first number-with-unit anywhere is used.
pub fn extract_limit_value(limit_text: &str, food_name: &str) -> Option<String> {
    if limit_text.is_empty() || food_name.is_empty() {
        return None;
    }

    let food_line = food_categories(food_name).into_iter().find_map(|name| {
        limit_text
            .lines()
            .find(|line| line.contains(&name))
            .map(str::to_string)
    });

    let Some(line) = food_line else {
        return UNIT_NUMBER
            .captures(limit_text)
            .map(|caps| format!("{} {}", &caps[1], &caps[2]));
    };

    let caps = LIMIT_VALUE.captures(&line)?;
    let value = caps[1].trim().to_string();
    let unit = caps
        .get(2)
        .map(|u| u.as_str())
        .unwrap_or("mg/kg")
        .to_string();

    if let Some(stripped) = value
        .strip_prefix('≤')
        .or_else(|| value.strip_prefix('<'))
    {
        Some(format!("≤{} {}", stripped.trim(), unit))
    } else {
        Some(format!("{value} {unit}"))
    }
}

/// Parses a report's measured value. 未检出, ND, and `<x` detection-limit
/// notation all read as 0.0.
pub fn parse_report_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains("未检出") || raw.to_uppercase().contains("ND") {
        return Some(0.0);
    }
    if raw.starts_with('<') {
        return Some(0.0);
    }
    FIRST_NUMBER
        .captures(raw)
        .and_then(|caps| caps[1].parse().ok())
}

/// Compares a report value against requirement text. Returns a problem
/// description, or `None` when compliant or not decidable. Only upper-bound
/// (`≤ x`) and 不得检出 limits are recognized.
pub fn check_limit_compliance(report_value: &str, limit_text: &str) -> Option<String> {
    if report_value.is_empty() || limit_text.is_empty() {
        return None;
    }
    let value = parse_report_value(report_value)?;
    let compact: String = limit_text.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.contains("不得检出") || compact.contains("不得检测出") {
        if value > 0.0 {
            return Some(format!("要求不得检出，实际检出 {report_value}"));
        }
        return None;
    }

    let limit: f64 = MAX_LIMIT.captures(&compact)?.get(1)?.as_str().parse().ok()?;
    if value > limit {
        return Some(format!("超标 (实测 {report_value} > 限量 {limit})"));
    }
    None
}
