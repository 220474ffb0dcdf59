//! GB designator parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref GB_NUMBER: Regex =
        Regex::new(r"GB(?:/T)?\s*(\d+(?:\.\d+)?)").expect("valid GB-number regex");
}

/// Returns the numeric id of a GB designator, without family prefix or year:
/// `"GB/T 5009.12-2017"` yields `"5009.12"`.
pub fn gb_number(code: &str) -> Option<String> {
    GB_NUMBER
        .captures(code)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_family_and_year() {
        assert_eq!(gb_number("GB/T 5009.12-2017").as_deref(), Some("5009.12"));
        assert_eq!(gb_number("GB 2763-2021").as_deref(), Some("2763"));
        assert_eq!(gb_number("GB2763—2021").as_deref(), Some("2763"));
    }

    #[test]
    fn non_gb_text_yields_none() {
        assert_eq!(gb_number("NY/T 761-2008"), None);
        assert_eq!(gb_number("企业标准"), None);
    }
}
