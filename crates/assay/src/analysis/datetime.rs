//! Datetime column battery.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use indexmap::IndexMap;

use super::types::{percentage, DatetimeStats};
use super::StatisticalAnalyzer;
use crate::error::{AnalysisError, ErrorCode};
use crate::input::coerce::to_datetime;
use crate::input::Column;

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render a span as `N days HH:MM:SS`.
pub(crate) fn format_span(span: TimeDelta) -> String {
    let total = span.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    format!(
        "{} days {:02}:{:02}:{:02}",
        days,
        rest / 3600,
        (rest % 3600) / 60,
        rest % 60
    )
}

fn distribution<'a>(names: impl Iterator<Item = &'a str>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for name in names {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

impl StatisticalAnalyzer {
    /// Analyze a datetime column.
    ///
    /// Datetime values are used as-is and strings are parsed; anything that
    /// does not yield a datetime counts as missing. A column with values of
    /// which none parse fails with `DatetimeParse`, an all-null one with
    /// `NoValidValues`.
    pub fn analyze_datetime(&self, column: &Column) -> Result<DatetimeStats, AnalysisError> {
        let parsed: Vec<NaiveDateTime> =
            column.non_null().filter_map(to_datetime).collect();

        let (Some(&min_date), Some(&max_date)) = (parsed.iter().min(), parsed.iter().max())
        else {
            let code = if column.null_count() < column.len() {
                ErrorCode::DatetimeParse
            } else {
                ErrorCode::NoValidValues
            };
            return Err(AnalysisError::new(code, "No valid datetime values found"));
        };

        let total = column.len();
        let missing_count = total - parsed.len();
        let span = max_date - min_date;

        let unique_years: HashSet<i32> = parsed.iter().map(|d| d.year()).collect();
        let unique_months: HashSet<u32> = parsed.iter().map(|d| d.month()).collect();
        let unique_days: HashSet<u32> = parsed.iter().map(|d| d.day()).collect();

        Ok(DatetimeStats {
            count: parsed.len(),
            missing_count,
            missing_percentage: percentage(missing_count, total),
            min_date,
            max_date,
            date_range: format_span(span),
            date_range_days: span.num_seconds() as f64 / 86_400.0,
            year_range: max_date.year() - min_date.year(),
            unique_years: unique_years.len(),
            unique_months: unique_months.len(),
            unique_days: unique_days.len(),
            weekday_distribution: distribution(
                parsed
                    .iter()
                    .map(|d| WEEKDAY_NAMES[d.weekday().num_days_from_monday() as usize]),
            ),
            month_distribution: distribution(
                parsed.iter().map(|d| MONTH_NAMES[d.month0() as usize]),
            ),
        })
    }
}
