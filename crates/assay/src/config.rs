//! Profiler configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};
use crate::input::ParserConfig;

/// Numeric cutoffs used across analysis and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// |z| above which a value is a z-score outlier.
    pub zscore: f64,
    /// IQR fence multiplier.
    pub iqr_multiplier: f64,
    /// |modified z| above which a value is an outlier.
    pub modified_zscore: f64,
    /// p-value above which data is considered normal.
    pub normality_alpha: f64,
    /// Minimum |r| for a strong correlation.
    pub correlation_strong: f64,
    /// Minimum |r| for a moderate correlation.
    pub correlation_moderate: f64,
    /// Unique-value count above which a column is high cardinality.
    pub high_cardinality: usize,
    /// Relative frequency below which a category is rare.
    pub rare_category: f64,
    /// Missing percentage above which imputation is recommended.
    pub missing_percentage: f64,
    /// Minimum success rate for partial float conversion.
    pub float_partial_rate: f64,
    /// Minimum success rate for partial datetime conversion.
    pub datetime_partial_rate: f64,
    /// Largest-class percentage below which a target is balanced.
    pub balanced_class_percentage: f64,
    /// Max/min top-10 count ratio above which categories are imbalanced.
    pub imbalance_ratio: f64,
    /// |skewness| above which a transform is recommended.
    pub skewness: f64,
    /// Coefficient of variation above which scaling is recommended.
    pub coefficient_of_variation: f64,
    /// Year span above which dates should be verified.
    pub year_range: i32,
    /// Row count below which a dataset is small.
    pub small_dataset_rows: usize,
    /// Row count above which a dataset is large.
    pub large_dataset_rows: usize,
    /// Estimated memory above which chunking is recommended.
    pub memory_mb: f64,
    /// Tolerated non-numeric share in messy numeric validation.
    pub validation: f64,
    /// Significance level for chi-square tests.
    pub chi_square_alpha: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            zscore: 3.0,
            iqr_multiplier: 1.5,
            modified_zscore: 3.5,
            normality_alpha: 0.05,
            correlation_strong: 0.7,
            correlation_moderate: 0.3,
            high_cardinality: 50,
            rare_category: 0.01,
            missing_percentage: 5.0,
            float_partial_rate: 0.9,
            datetime_partial_rate: 0.8,
            balanced_class_percentage: 70.0,
            imbalance_ratio: 10.0,
            skewness: 2.0,
            coefficient_of_variation: 1.0,
            year_range: 50,
            small_dataset_rows: 100,
            large_dataset_rows: 1_000_000,
            memory_mb: 1000.0,
            validation: 0.05,
            chi_square_alpha: 0.05,
        }
    }
}

impl Thresholds {
    /// Reject negative, non-finite or out-of-range cutoffs.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("zscore", self.zscore),
            ("iqr_multiplier", self.iqr_multiplier),
            ("modified_zscore", self.modified_zscore),
            ("correlation_strong", self.correlation_strong),
            ("correlation_moderate", self.correlation_moderate),
            ("missing_percentage", self.missing_percentage),
            ("imbalance_ratio", self.imbalance_ratio),
            ("skewness", self.skewness),
            ("coefficient_of_variation", self.coefficient_of_variation),
            ("memory_mb", self.memory_mb),
            ("balanced_class_percentage", self.balanced_class_percentage),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AssayError::Config(format!(
                    "threshold '{name}' must be a non-negative finite number, got {value}"
                )));
            }
        }

        let fractions = [
            ("normality_alpha", self.normality_alpha),
            ("rare_category", self.rare_category),
            ("float_partial_rate", self.float_partial_rate),
            ("datetime_partial_rate", self.datetime_partial_rate),
            ("validation", self.validation),
            ("chi_square_alpha", self.chi_square_alpha),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(AssayError::Config(format!(
                    "threshold '{name}' must be between 0 and 1, got {value}"
                )));
            }
        }

        if self.correlation_moderate > self.correlation_strong {
            return Err(AssayError::Config(format!(
                "correlation_moderate ({}) exceeds correlation_strong ({})",
                self.correlation_moderate, self.correlation_strong
            )));
        }
        if self.year_range < 0 {
            return Err(AssayError::Config(format!(
                "threshold 'year_range' must be non-negative, got {}",
                self.year_range
            )));
        }
        Ok(())
    }
}

/// How the type converter participates in a profiling run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Do not run the converter.
    #[default]
    Off,
    /// Report conversion opportunities; profile the original data.
    Report,
    /// Profile the converted copy.
    Apply,
}

/// Configuration for a profiling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Analysis and recommendation cutoffs.
    pub thresholds: Thresholds,
    /// Target columns for correlation and distribution analysis.
    pub target_columns: Vec<String>,
    /// Columns that should uniquely identify a row.
    pub id_columns: Vec<String>,
    /// Whether and how to run the type converter.
    pub conversion: ConversionMode,
    /// Fail on messy numeric columns instead of reporting them.
    pub strict_validation: bool,
    /// Run the messy numeric validator.
    pub validate_input: bool,
    /// Loader settings used by path-based profiling.
    pub parser: ParserConfig,
}

impl ProfilerConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| AssayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: ProfilerConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every threshold.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()
    }

    /// Set the target columns.
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_columns = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the ID columns.
    pub fn with_id_columns<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_columns = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the conversion mode.
    pub fn with_conversion(mut self, mode: ConversionMode) -> Self {
        self.conversion = mode;
        self
    }

    /// Enable input validation; `strict` makes issues fatal.
    pub fn with_validation(mut self, strict: bool) -> Self {
        self.validate_input = true;
        self.strict_validation = strict;
        self
    }

    /// Replace the thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}
