//! FILENAME: core/report-engine/src/format.rs
//! PURPOSE: Text formatting of amounts and dates for report cells.
//! CONTEXT: Amounts use two fraction digits with ',' as decimal separator and
//! '.' grouping thousands ("1.234,50"). Dates print as DD/MM/YYYY.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use engine::CellValue;

use crate::definition::ColumnFormat;

/// Formats an amount: `1234.5` -> `"1.234,50"`, `-0.001` -> `"0,00"`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.2}", value.abs());
    let (integer_part, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let negative = value < 0.0 && rounded.chars().any(|c| c != '0' && c != '.');

    let mut result = String::with_capacity(rounded.len() + integer_part.len() / 3 + 1);
    if negative {
        result.push('-');
    }
    result.push_str(&add_thousands_separator(integer_part, '.'));
    result.push(',');
    result.push_str(fraction);
    result
}

/// Groups a run of digits in threes.
fn add_thousands_separator(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(separator);
        }
        result.push(c);
    }

    result
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Parses the date forms records usually carry.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}

/// `"2024-03-05"` -> `Some("05/03/2024")`.
pub fn format_date(text: &str) -> Option<String> {
    parse_date(text).map(|date| date.format("%d/%m/%Y").to_string())
}

/// Text of a record value under a column format. A value that is not a
/// parsable date is returned unchanged.
pub fn format_value(value: &CellValue, format: ColumnFormat) -> String {
    match format {
        ColumnFormat::None => value.display(),
        ColumnFormat::Currency => format_amount(value.to_number()),
        ColumnFormat::Date => {
            let raw = value.display();
            format_date(&raw).unwrap_or(raw)
        }
    }
}
