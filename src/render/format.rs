//! Text formatting shared by the table and chart renderers.

use crate::data::cell_value::CellValue;
use regex::Regex;
use std::sync::OnceLock;

static DATE_LIKE_COLUMN: OnceLock<Regex> = OnceLock::new();

fn date_like_pattern() -> &'static Regex {
    DATE_LIKE_COLUMN.get_or_init(|| {
        // year / date, plus Korean year (년, 연도) and month (월)
        Regex::new(r"(?i)year|date|연도|년|월").expect("static pattern")
    })
}

/// Column names that hold years or dates keep their raw digits (2024, not
/// 2,024).
pub fn is_date_like_column(name: &str) -> bool {
    date_like_pattern().is_match(name)
}

/// Escape text for insertion into HTML so it is never parsed as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Insert `,` every three digits of an unsigned digit string.
fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Thousands-separated number with at most three fraction digits
/// (`1234567.891` -> `1,234,567.891`, `1500` -> `1,500`).
pub fn format_thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::new();
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn format_count(count: u64) -> String {
    group_digits(&count.to_string())
}

/// Thousands-separated integer, exact over the whole `i64` range.
pub fn format_integer(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Short axis label: `x.xM` from one million, `x.xK` from one thousand,
/// otherwise the rounded integer.
pub fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{}", value.round() as i64)
    }
}

/// One-decimal percentage without the sign, e.g. `75.0`.
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}", percent)
}

/// Display text for a body cell. Numeric values in numeric columns get
/// thousands separators unless the column looks like a year or date.
pub fn format_cell(value: &CellValue, column: &str, numeric_column: bool) -> String {
    if numeric_column && !is_date_like_column(column) {
        if let CellValue::Integer(i) = value {
            return format_integer(*i);
        }
        if let Some(number) = value.as_number() {
            return format_thousands(number);
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(1234.5678), "1,234.568");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(-1500.25), "-1,500.25");
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(-0.0001), "0");
        assert_eq!(format_count(1_000_000), "1,000,000");
    }

    #[test]
    fn test_format_integer_keeps_every_digit() {
        assert_eq!(format_integer(12345678901234567), "12,345,678,901,234,567");
        assert_eq!(format_integer(-1500), "-1,500");
        assert_eq!(format_integer(0), "0");
        assert_eq!(format_integer(i64::MIN), "-9,223,372,036,854,775,808");
        assert_eq!(
            format_cell(&CellValue::Integer(12345678901234567), "id", true),
            "12,345,678,901,234,567"
        );
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(2_500_000.0), "2.5M");
        assert_eq!(format_compact(1_000_000.0), "1.0M");
        assert_eq!(format_compact(15_300.0), "15.3K");
        assert_eq!(format_compact(999.4), "999");
        assert_eq!(format_compact(-2_000.0), "-2.0K");
        assert_eq!(format_compact(7.0), "7");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(75.0), "75.0");
        assert_eq!(format_percent(100.0 / 3.0), "33.3");
    }

    #[test]
    fn test_date_like_columns() {
        assert!(is_date_like_column("birth_year"));
        assert!(is_date_like_column("OrderDate"));
        assert!(is_date_like_column("기준연도"));
        assert!(is_date_like_column("기준월"));
        assert!(!is_date_like_column("population"));
    }

    #[test]
    fn test_format_cell() {
        let v = CellValue::Integer(2024);
        assert_eq!(format_cell(&v, "year", true), "2024");
        assert_eq!(format_cell(&v, "population", true), "2,024");
        assert_eq!(format_cell(&v, "population", false), "2024");
        assert_eq!(format_cell(&CellValue::from("n/a"), "population", true), "n/a");
        assert_eq!(format_cell(&CellValue::Null, "population", true), "");
    }
}
