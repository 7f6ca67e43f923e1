//! Column conversion to float and datetime storage.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::report::{ConversionAnalysis, ConversionReport, ConversionTarget, PartialConversion};
use crate::config::Thresholds;
use crate::error::Result;
use crate::input::coerce::{
    parse_datetime_auto, parse_datetime_with, parse_integer, to_datetime, to_number,
};
use crate::input::{Column, DType, Dataset, Scalar};

/// Explicit datetime formats, tried in order before auto-inference.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y",
    "%Y%m%d",
];

/// Maximum failing values kept per partially convertible column.
const MAX_INVALID_EXAMPLES: usize = 3;

/// Everything a conversion pass produces besides the converted data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub float: ConversionReport,
    pub datetime: ConversionReport,
    pub float_analysis: ConversionAnalysis,
    pub datetime_analysis: ConversionAnalysis,
}

/// Attempts float and datetime conversion of every column.
#[derive(Debug, Clone)]
pub struct TypeConverter {
    float_partial_rate: f64,
    datetime_partial_rate: f64,
}

impl Default for TypeConverter {
    fn default() -> Self {
        Self::with_thresholds(&Thresholds::default())
    }
}

/// Result of one conversion attempt on one column.
enum Attempt {
    Full(Column),
    Partial(Column, PartialConversion),
    Unconvertible,
    AlreadyTyped,
}

impl TypeConverter {
    /// Create a converter with default acceptance rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter using the partial-conversion rates from `thresholds`.
    pub fn with_thresholds(thresholds: &Thresholds) -> Self {
        Self {
            float_partial_rate: thresholds.float_partial_rate,
            datetime_partial_rate: thresholds.datetime_partial_rate,
        }
    }

    /// Convert what can be converted and report how every column fared.
    ///
    /// Each column gets a float attempt; a column the float attempt did not
    /// fully convert then gets a datetime attempt. Successful conversions
    /// are applied to the returned copy. The input is not modified.
    pub fn find_and_convert_columns(
        &self,
        dataset: &Dataset,
    ) -> Result<(Dataset, ConversionOutcome)> {
        let mut converted = dataset.clone();
        let mut float = ConversionReport::new(ConversionTarget::Float);
        let mut datetime = ConversionReport::new(ConversionTarget::Datetime);

        for column in dataset.columns() {
            let name = column.name().to_string();

            let float_full = match self.try_float(column) {
                Attempt::Full(col) => {
                    converted.replace_column(col)?;
                    float.convertible_columns.push(name.clone());
                    true
                }
                Attempt::Partial(col, partial) => {
                    converted.replace_column(col)?;
                    float.partially_convertible_columns.insert(name.clone(), partial);
                    false
                }
                Attempt::Unconvertible => {
                    float.unconvertible_columns.push(name.clone());
                    false
                }
                Attempt::AlreadyTyped => {
                    float.already_typed_columns.push(name.clone());
                    false
                }
            };

            if float_full {
                datetime.unconvertible_columns.push(name);
                continue;
            }

            // Partial float conversions are already applied, so look at the working copy.
            let current = converted.column(&name).unwrap_or(column);
            match self.try_datetime(current) {
                Attempt::Full(col) => {
                    converted.replace_column(col)?;
                    datetime.convertible_columns.push(name);
                }
                Attempt::Partial(col, partial) => {
                    converted.replace_column(col)?;
                    datetime.partially_convertible_columns.insert(name, partial);
                }
                Attempt::Unconvertible => datetime.unconvertible_columns.push(name),
                Attempt::AlreadyTyped => datetime.already_typed_columns.push(name),
            }
        }

        log_report(&float);
        log_report(&datetime);

        let outcome = ConversionOutcome {
            float_analysis: float.analyze(),
            datetime_analysis: datetime.analyze(),
            float,
            datetime,
        };
        Ok((converted, outcome))
    }

    // ===== FLOAT =====

    fn try_float(&self, column: &Column) -> Attempt {
        match column.dtype() {
            DType::Float64 => return Attempt::AlreadyTyped,
            DType::DateTime => return Attempt::Unconvertible,
            DType::Int64 | DType::Boolean => return Attempt::Full(column.clone()),
            DType::Categorical | DType::Object => {}
        }

        let parsed: Vec<Option<f64>> = column
            .values()
            .iter()
            .map(|v| v.as_ref().and_then(to_number))
            .collect();

        let strict = column
            .values()
            .iter()
            .zip(&parsed)
            .all(|(raw, num)| raw.is_none() || num.is_some());

        if strict {
            return Attempt::Full(numeric_column(column));
        }

        let valid = parsed.iter().filter(|v| v.is_some()).count();
        let total = column.len();
        let rate = success_rate(valid, total);
        debug!(column = column.name(), valid, total, rate, "float coercion");

        if valid >= 1 && rate >= self.float_partial_rate {
            let partial = PartialConversion {
                success_rate: rate,
                valid_count: valid,
                total_count: total,
                invalid_examples: invalid_examples(column, &parsed),
            };
            Attempt::Partial(Column::from_floats(column.name(), parsed), partial)
        } else {
            Attempt::Unconvertible
        }
    }

    // ===== DATETIME =====

    fn try_datetime(&self, column: &Column) -> Attempt {
        match column.dtype() {
            DType::DateTime => return Attempt::AlreadyTyped,
            dtype if dtype.is_numeric_like() => return Attempt::Unconvertible,
            _ => {}
        }

        for format in DATETIME_FORMATS {
            if let Some(col) = parse_all(column, |text| parse_datetime_with(text, format)) {
                debug!(column = column.name(), format, "datetime format matched");
                return Attempt::Full(col);
            }
        }
        if let Some(col) = parse_all(column, parse_datetime_auto) {
            return Attempt::Full(col);
        }

        let parsed: Vec<_> = column
            .values()
            .iter()
            .map(|v| v.as_ref().and_then(to_datetime))
            .collect();
        let valid = parsed.iter().filter(|v| v.is_some()).count();
        let total = column.len();
        let rate = success_rate(valid, total);
        debug!(column = column.name(), valid, total, rate, "datetime coercion");

        if valid >= 1 && rate >= self.datetime_partial_rate {
            let partial = PartialConversion {
                success_rate: rate,
                valid_count: valid,
                total_count: total,
                invalid_examples: invalid_examples(column, &parsed),
            };
            Attempt::Partial(Column::from_datetimes(column.name(), parsed), partial)
        } else {
            Attempt::Unconvertible
        }
    }
}

/// Parse every non-null value with `parse`, or give up on the first failure.
fn parse_all<F>(column: &Column, parse: F) -> Option<Column>
where
    F: Fn(&str) -> Option<chrono::NaiveDateTime>,
{
    let values = column
        .values()
        .iter()
        .map(|v| match v {
            None => Some(None),
            Some(Scalar::Str(s)) => parse(s).map(Some),
            Some(Scalar::DateTime(dt)) => Some(Some(*dt)),
            Some(_) => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Column::from_datetimes(column.name(), values))
}

/// Build the numeric form of a column whose non-null values all parse.
///
/// Integral text with no nulls becomes `Int64`; anything else `Float64`.
fn numeric_column(column: &Column) -> Column {
    let ints: Option<Vec<Option<i64>>> = column
        .values()
        .iter()
        .map(|v| match v {
            Some(Scalar::Int(i)) => Some(Some(*i)),
            Some(Scalar::Str(s)) => parse_integer(s).map(Some),
            _ => None,
        })
        .collect();

    match ints {
        Some(ints) => Column::from_ints(column.name(), ints),
        None => Column::from_floats(
            column.name(),
            column.values().iter().map(|v| v.as_ref().and_then(to_number)),
        ),
    }
}

fn success_rate(valid: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        valid as f64 / total as f64
    }
}

/// First few non-null values whose conversion failed.
fn invalid_examples<T>(column: &Column, parsed: &[Option<T>]) -> Vec<String> {
    column
        .values()
        .iter()
        .zip(parsed)
        .filter_map(|(raw, conv)| match (raw, conv) {
            (Some(value), None) => Some(value.to_string()),
            _ => None,
        })
        .take(MAX_INVALID_EXAMPLES)
        .collect()
}

fn log_report(report: &ConversionReport) {
    info!(
        target_type = %report.target,
        convertible = report.convertible_columns.len(),
        partial = report.partially_convertible_columns.len(),
        unconvertible = report.unconvertible_columns.len(),
        already = report.already_typed_columns.len(),
        "conversion report"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionBucket;

    fn strs(name: &str, values: &[&str]) -> Column {
        Column::from_strs(name, values.iter().map(|s| Some(*s)))
    }

    fn repeated(name: &str, good: &str, good_n: usize, bad: &str, bad_n: usize) -> Column {
        let values: Vec<&str> = std::iter::repeat_n(good, good_n)
            .chain(std::iter::repeat_n(bad, bad_n))
            .collect();
        strs(name, &values)
    }

    #[test]
    fn test_every_column_lands_in_one_bucket_per_target() {
        let ds = Dataset::new(vec![
            Column::from_floats("f", vec![Some(1.5), None]),
            Column::from_ints("i", vec![Some(1), Some(2)]),
            strs("num_text", &["1", "2"]),
            strs("dates", &["2024-01-01", "2024-02-01"]),
            strs("words", &["a", "b"]),
            Column::from_datetimes("dt", vec![None, None]),
            Column::from_bools("flag", vec![Some(true), Some(false)]),
        ])
        .unwrap();

        let (_, outcome) = TypeConverter::new().find_and_convert_columns(&ds).unwrap();

        for report in [&outcome.float, &outcome.datetime] {
            assert_eq!(report.total_columns(), ds.column_count());
            for name in ds.column_names() {
                assert!(report.bucket_of(name).is_some(), "{name} missing");
            }
        }
        assert_eq!(outcome.float.bucket_of("f"), Some(ConversionBucket::AlreadyTyped));
        assert_eq!(outcome.float.bucket_of("dt"), Some(ConversionBucket::Unconvertible));
        assert_eq!(outcome.float.bucket_of("num_text"), Some(ConversionBucket::Convertible));
        assert_eq!(outcome.datetime.bucket_of("num_text"), Some(ConversionBucket::Unconvertible));
        assert_eq!(outcome.datetime.bucket_of("dates"), Some(ConversionBucket::Convertible));
        assert_eq!(outcome.datetime.bucket_of("dt"), Some(ConversionBucket::AlreadyTyped));
        assert_eq!(outcome.datetime.bucket_of("words"), Some(ConversionBucket::Unconvertible));
        assert_eq!(outcome.datetime.bucket_of("f"), Some(ConversionBucket::Unconvertible));
    }

    #[test]
    fn test_input_is_untouched_and_copy_is_converted() {
        let ds = Dataset::new(vec![
            strs("n", &["1", "2", "3"]),
            strs("d", &["2024-01-01", "2024-01-02", "2024-01-03"]),
        ])
        .unwrap();
        let before = ds.clone();
        let (converted, _) = TypeConverter::new().find_and_convert_columns(&ds).unwrap();

        assert_eq!(ds, before);
        assert_eq!(converted.column("n").unwrap().dtype(), DType::Int64);
        assert_eq!(converted.column("d").unwrap().dtype(), DType::DateTime);
    }

    #[test]
    fn test_decimal_or_null_text_becomes_float() {
        let ds = Dataset::new(vec![
            Column::from_strs("a", vec![Some("1"), None]),
            strs("b", &["1.5", "2"]),
        ])
        .unwrap();
        let (converted, _) = TypeConverter::new().find_and_convert_columns(&ds).unwrap();
        assert_eq!(converted.column("a").unwrap().dtype(), DType::Float64);
        assert_eq!(converted.column("b").unwrap().dtype(), DType::Float64);
    }

    #[test]
    fn test_float_partial_boundary() {
        let accepted = Dataset::new(vec![repeated("x", "1.5", 9, "bad", 1)]).unwrap();
        let (converted, outcome) = TypeConverter::new().find_and_convert_columns(&accepted).unwrap();
        let partial = &outcome.float.partially_convertible_columns["x"];
        assert_eq!(partial.success_rate, 0.9);
        assert_eq!(partial.valid_count, 9);
        assert_eq!(partial.total_count, 10);
        assert_eq!(partial.invalid_examples, vec!["bad".to_string()]);
        assert_eq!(converted.column("x").unwrap().dtype(), DType::Float64);
        assert_eq!(converted.column("x").unwrap().null_count(), 1);

        let rejected = Dataset::new(vec![repeated("x", "1.5", 899, "bad", 101)]).unwrap();
        let (converted, outcome) = TypeConverter::new().find_and_convert_columns(&rejected).unwrap();
        assert_eq!(outcome.float.bucket_of("x"), Some(ConversionBucket::Unconvertible));
        assert_eq!(converted.column("x").unwrap().dtype(), DType::Object);
    }

    #[test]
    fn test_datetime_partial_boundary() {
        let accepted = Dataset::new(vec![repeated("d", "2024-03-01", 8, "soon", 2)]).unwrap();
        let (converted, outcome) = TypeConverter::new().find_and_convert_columns(&accepted).unwrap();
        assert_eq!(outcome.float.bucket_of("d"), Some(ConversionBucket::Unconvertible));
        let partial = &outcome.datetime.partially_convertible_columns["d"];
        assert_eq!(partial.success_rate, 0.8);
        assert_eq!(partial.invalid_examples, vec!["soon".to_string(), "soon".to_string()]);
        assert_eq!(converted.column("d").unwrap().dtype(), DType::DateTime);

        let rejected = Dataset::new(vec![repeated("d", "2024-03-01", 799, "soon", 201)]).unwrap();
        let (_, outcome) = TypeConverter::new().find_and_convert_columns(&rejected).unwrap();
        assert_eq!(outcome.datetime.bucket_of("d"), Some(ConversionBucket::Unconvertible));
    }

    #[test]
    fn test_nulls_count_against_success_rate() {
        let mut values: Vec<Option<&str>> = vec![Some("1"); 8];
        values.push(None);
        values.push(Some("z"));
        let ds = Dataset::new(vec![Column::from_strs("x", values)]).unwrap();
        let (_, outcome) = TypeConverter::new().find_and_convert_columns(&ds).unwrap();
        // 8 of 10 valid is below the float rate.
        assert_eq!(outcome.float.bucket_of("x"), Some(ConversionBucket::Unconvertible));
    }

    #[test]
    fn test_partially_converted_floats_skip_datetime() {
        let ds = Dataset::new(vec![repeated("x", "7", 19, "?", 1)]).unwrap();
        let (_, outcome) = TypeConverter::new().find_and_convert_columns(&ds).unwrap();
        assert_eq!(outcome.float.bucket_of("x"), Some(ConversionBucket::PartiallyConvertible));
        assert_eq!(outcome.datetime.bucket_of("x"), Some(ConversionBucket::Unconvertible));
    }

    #[test]
    fn test_explicit_day_first_format() {
        let ds = Dataset::new(vec![strs("d", &["25/12/2024", "31/01/2023"])]).unwrap();
        let (converted, _) = TypeConverter::new().find_and_convert_columns(&ds).unwrap();
        let col = converted.column("d").unwrap();
        assert_eq!(col.dtype(), DType::DateTime);
        assert_eq!(col.get(0).unwrap().to_string(), "2024-12-25 00:00:00");
    }
}
