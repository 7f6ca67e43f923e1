//! Lenient value coercion shared by analysis, conversion and validation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::dataset::Scalar;

/// Formats tried, in order, when no explicit format is given.
const AUTO_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a number the way a lenient numeric coercion would.
///
/// Surrounding whitespace is ignored; `NaN` text is not a number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parse an integer, ignoring surrounding whitespace.
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Numeric view of a scalar, parsing strings.
pub fn to_number(value: &Scalar) -> Option<f64> {
    match value {
        Scalar::Str(s) => parse_number(s),
        other => other.as_f64(),
    }
}

/// Parse text with one explicit format. Date-only formats yield midnight.
pub fn parse_datetime_with(text: &str, format: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    NaiveDateTime::parse_from_str(trimmed, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse text by trying RFC 3339 and then the common formats in order.
///
/// Offsets are dropped; the wall-clock time is kept.
pub fn parse_datetime_auto(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    AUTO_FORMATS
        .iter()
        .find_map(|format| parse_datetime_with(trimmed, format))
}

/// Datetime view of a scalar: datetimes as-is, strings parsed, anything else invalid.
pub fn to_datetime(value: &Scalar) -> Option<NaiveDateTime> {
    match value {
        Scalar::DateTime(dt) => Some(*dt),
        Scalar::Str(s) => parse_datetime_auto(s),
        _ => None,
    }
}
