//! Per-column statistics produced by the analyzers.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ErrorCode};
use crate::serde_ext::{nan_sentinel, nan_sentinel_map};
use crate::stats::NormalityTest;

/// Counts of values flagged by the three outlier methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    /// Values with |z| above the threshold (population standard deviation).
    pub zscore_outliers: usize,
    #[serde(with = "nan_sentinel")]
    pub zscore_percentage: f64,
    /// Values outside the IQR fences.
    pub iqr_outliers: usize,
    #[serde(with = "nan_sentinel")]
    pub iqr_percentage: f64,
    #[serde(with = "nan_sentinel")]
    pub iqr_lower_bound: f64,
    #[serde(with = "nan_sentinel")]
    pub iqr_upper_bound: f64,
    /// Values with |modified z| above the threshold.
    pub modified_zscore_outliers: usize,
    #[serde(with = "nan_sentinel")]
    pub modified_zscore_percentage: f64,
}

/// Shape of the distribution and normality test outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Shapiro-Wilk result, run for more than three values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapiro: Option<NormalityTest>,
    /// `p > alpha` for the Shapiro-Wilk test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_normal: Option<bool>,
    /// D'Agostino-Pearson K² result, run for more than eight values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dagostino: Option<NormalityTest>,
    /// Why a normality test could not be computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normality_test_error: Option<String>,
    pub is_skewed: bool,
    pub is_heavy_tailed: bool,
}

/// Statistics for a numeric column. Nulls are excluded from `count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: usize,
    pub missing_count: usize,
    #[serde(with = "nan_sentinel")]
    pub missing_percentage: f64,
    #[serde(with = "nan_sentinel")]
    pub mean: f64,
    #[serde(with = "nan_sentinel")]
    pub median: f64,
    pub mode: Option<f64>,
    #[serde(with = "nan_sentinel")]
    pub std: f64,
    #[serde(with = "nan_sentinel")]
    pub variance: f64,
    #[serde(with = "nan_sentinel")]
    pub min: f64,
    #[serde(with = "nan_sentinel")]
    pub max: f64,
    #[serde(with = "nan_sentinel")]
    pub range: f64,
    #[serde(with = "nan_sentinel")]
    pub q1: f64,
    #[serde(with = "nan_sentinel")]
    pub q3: f64,
    #[serde(with = "nan_sentinel")]
    pub iqr: f64,
    #[serde(with = "nan_sentinel")]
    pub skewness: f64,
    #[serde(with = "nan_sentinel")]
    pub kurtosis: f64,
    #[serde(with = "nan_sentinel")]
    pub coefficient_of_variation: f64,
    pub outliers: OutlierSummary,
    pub distribution: DistributionSummary,
}

/// Statistics for a categorical column. Nulls are included in `count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub count: usize,
    pub missing_count: usize,
    #[serde(with = "nan_sentinel")]
    pub missing_percentage: f64,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// `unique_count / count`.
    #[serde(with = "nan_sentinel")]
    pub cardinality: f64,
    pub mode: Option<String>,
    /// Ten most frequent values, most frequent first.
    pub value_counts: IndexMap<String, usize>,
    /// Percentages of `count` for the same values.
    #[serde(with = "nan_sentinel_map")]
    pub value_percentages: IndexMap<String, f64>,
    /// Values rarer than the rare-category threshold among non-null values.
    pub rare_categories: Vec<String>,
    pub is_high_cardinality: bool,
}

/// Statistics for a datetime column. Unparseable values count as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatetimeStats {
    pub count: usize,
    pub missing_count: usize,
    #[serde(with = "nan_sentinel")]
    pub missing_percentage: f64,
    pub min_date: NaiveDateTime,
    pub max_date: NaiveDateTime,
    /// Span between min and max, e.g. `365 days 00:00:00`.
    pub date_range: String,
    #[serde(with = "nan_sentinel")]
    pub date_range_days: f64,
    pub year_range: i32,
    pub unique_years: usize,
    pub unique_months: usize,
    pub unique_days: usize,
    pub weekday_distribution: IndexMap<String, usize>,
    pub month_distribution: IndexMap<String, usize>,
}

/// Which analysis was attempted for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Numeric,
    Categorical,
    Datetime,
    Other,
}

/// A column whose analysis failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub code: ErrorCode,
    /// Failure message, reported verbatim.
    pub error: String,
    /// Analysis that failed, if one was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted: Option<AnalysisKind>,
    pub count: usize,
    pub missing_count: usize,
    #[serde(with = "nan_sentinel")]
    pub missing_percentage: f64,
}

impl ErrorStats {
    /// Build from an embedded error and the column's size.
    pub fn new(
        error: AnalysisError,
        attempted: Option<AnalysisKind>,
        count: usize,
        missing_count: usize,
    ) -> Self {
        Self {
            code: error.code,
            error: error.message,
            attempted,
            count,
            missing_count,
            missing_percentage: percentage(missing_count, count),
        }
    }
}

/// Type-tagged statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Categorical(CategoricalStats),
    Datetime(DatetimeStats),
    /// Categorical statistics for a column matching no other analysis.
    Other(CategoricalStats),
    Error(ErrorStats),
}

impl ColumnStats {
    /// The `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnStats::Numeric(_) => "numeric",
            ColumnStats::Categorical(_) => "categorical",
            ColumnStats::Datetime(_) => "datetime",
            ColumnStats::Other(_) => "other",
            ColumnStats::Error(_) => "error",
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnStats::Numeric(s) => s.missing_count,
            ColumnStats::Categorical(s) | ColumnStats::Other(s) => s.missing_count,
            ColumnStats::Datetime(s) => s.missing_count,
            ColumnStats::Error(s) => s.missing_count,
        }
    }

    pub fn missing_percentage(&self) -> f64 {
        match self {
            ColumnStats::Numeric(s) => s.missing_percentage,
            ColumnStats::Categorical(s) | ColumnStats::Other(s) => s.missing_percentage,
            ColumnStats::Datetime(s) => s.missing_percentage,
            ColumnStats::Error(s) => s.missing_percentage,
        }
    }

    /// Returns true if analysis failed.
    pub fn is_error(&self) -> bool {
        matches!(self, ColumnStats::Error(_))
    }
}

/// `part / whole * 100`, NaN when `whole` is zero.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        f64::NAN
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
