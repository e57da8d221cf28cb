//! Display formatting and numeric input normalisation.
//!
//! Every formatter degrades to a zero rendering for non-finite values
//! instead of printing `NaN` or `inf`.

use crate::types::AssetCategory;

/// Format a value as US dollars with thousands separators, e.g. `-$1,234.50`.
pub fn format_currency(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }

    let body = group_thousands(&format!("{:.*}", decimals, value.abs()));
    if value < 0.0 {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Category-aware price formatter: 4 decimals for forex (pip precision), 2 otherwise.
pub fn format_price(value: f64, category: Option<AssetCategory>) -> String {
    let decimals = match category {
        Some(AssetCategory::Forex) => 4,
        _ => 2,
    };
    format_currency(value, decimals)
}

/// Format a percentage with an explicit sign, e.g. `+2.50%`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0.00%".to_string();
    }

    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{:.*}%", decimals, value)
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    format!("{:.*}", decimals, value)
}

/// Insert thousands separators into a raw numeric string, preserving decimals.
///
/// ```rust
/// use tradewise_core::format::display_num;
///
/// assert_eq!(display_num("1234567.891"), "1,234,567.891");
/// assert_eq!(display_num("12,34"), "1,234");
/// ```
pub fn display_num(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let stripped = raw.replace(',', "");
    match stripped.split_once('.') {
        Some((int, dec)) => format!("{}.{}", group_thousands(int), dec),
        None => group_thousands(&stripped),
    }
}

/// Normalise numeric keyboard input across locales.
///
/// A trailing comma (the European decimal key) becomes a decimal point;
/// any other comma is treated as a thousands separator and dropped.
pub fn normalize_input(raw: &str) -> String {
    match raw.strip_suffix(',') {
        Some(head) => format!("{}.", head.replace(',', "")),
        None => raw.replace(',', ""),
    }
}

/// Parse a user-entered number. Returns `None` for empty, unparseable or
/// non-finite input.
pub fn parse_number(raw: &str) -> Option<f64> {
    let normalized = normalize_input(raw.trim());
    let normalized = normalized.trim_end_matches('.');
    if normalized.is_empty() {
        return None;
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Group the integer digits of `s` in threes. Leaves a leading sign and
/// any fractional part untouched.
fn group_thousands(s: &str) -> String {
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };

    let (sign, digits) = match int.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
