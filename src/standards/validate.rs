//! Validity rule: the cited standard must be in force on the production
//! date.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::{StandardInfo, StandardStatus};

lazy_static! {
    /// Year, month, day with any single non-digit separator.
    static ref FLEX_DATE: Regex =
        Regex::new(r"^\s*(\d{4})\D(\d{1,2})\D(\d{1,2})\D?\s*$").expect("valid flex-date regex");
}

/// Parses `YYYY-MM-DD`, `YYYY/M/D`, `YYYY.M.D`, `YYYY年M月D日` and the like.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let caps = FLEX_DATE.captures(s)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Outcome of checking one standard against a production date. Every failed
/// check appends a reason; `passed` means zero reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implement_date: Option<NaiveDate>,
    pub status: StandardStatus,
}

/// Checks, in order: status reads 现行有效; implement date parses; the
/// production date is not earlier than the implement date.
pub fn validate_for_production_date(
    production_date: &str,
    info: &StandardInfo,
) -> ValidationResult {
    let mut reasons = Vec::new();

    let prod = parse_flexible_date(production_date);
    if prod.is_none() {
        reasons.push(format!("生产日期无法解析（原值：{production_date}）"));
    }

    if !info.status.is_current() {
        reasons.push(format!(
            "标准状态不是现行有效（当前为：{}）",
            info.status.phrase()
        ));
    }

    let implement = match info.implement_date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let parsed = parse_flexible_date(raw);
            if parsed.is_none() {
                reasons.push(format!("实施日期无法解析（原值：{raw}）"));
            }
            parsed
        }
        _ => {
            reasons.push("缺少实施日期".to_string());
            None
        }
    };

    if let (Some(prod), Some(implement)) = (prod, implement) {
        if prod < implement {
            reasons.push(format!(
                "生产日期早于实施日期（生产日期：{prod}，实施日期：{implement}）"
            ));
        }
    }

    ValidationResult {
        passed: reasons.is_empty(),
        reasons,
        production_date: prod,
        implement_date: implement,
        status: info.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(status: StandardStatus, implement: Option<&str>) -> StandardInfo {
        StandardInfo {
            status,
            implement_date: implement.map(str::to_string),
            ..StandardInfo::default()
        }
    }

    #[test]
    fn flexible_date_separators() {
        let expected = NaiveDate::from_ymd_opt(2021, 9, 3).unwrap();
        for raw in ["2021-09-03", "2021/9/3", "2021.9.3", "2021年9月3日"] {
            assert_eq!(parse_flexible_date(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_flexible_date("2021-13-01"), None);
        assert_eq!(parse_flexible_date("暂无"), None);
    }

    #[test]
    fn current_and_implemented_before_production_passes() {
        let result = validate_for_production_date(
            "2024-12-03",
            &info(StandardStatus::Current, Some("2021-09-03")),
        );
        assert!(result.passed);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn production_on_implement_day_passes() {
        let result = validate_for_production_date(
            "2021-09-03",
            &info(StandardStatus::Current, Some("2021-09-03")),
        );
        assert!(result.passed);
    }

    #[test]
    fn production_before_implement_fails() {
        let result = validate_for_production_date(
            "2021-09-02",
            &info(StandardStatus::Current, Some("2021-09-03")),
        );
        assert!(!result.passed);
        assert!(result.reasons.iter().any(|r| r.contains("早于实施日期")));
    }

    #[test]
    fn abolished_standard_fails_regardless_of_dates() {
        let result = validate_for_production_date(
            "2024-01-01",
            &info(StandardStatus::Abolished, Some("2016-01-01")),
        );
        assert!(!result.passed);
        assert!(result.reasons.iter().any(|r| r.contains("现行有效")));
    }

    #[test]
    fn missing_implement_date_is_a_reason() {
        let result =
            validate_for_production_date("2024-01-01", &info(StandardStatus::Current, None));
        assert!(!result.passed);
        assert!(result.reasons.iter().any(|r| r.contains("缺少实施日期")));
    }

    #[test]
    fn unknown_status_is_conservative() {
        let result = validate_for_production_date(
            "2024-01-01",
            &info(StandardStatus::Unknown, Some("2021-09-03")),
        );
        assert!(!result.passed);
    }
}
