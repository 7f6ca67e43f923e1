//! Type-specific column statistics.
//!
//! [`StatisticalAnalyzer`] runs one of three fixed batteries on a column.
//! Data-dependent failures come back as [`AnalysisError`] values so callers
//! can embed them in results instead of aborting.
//!
//! [`AnalysisError`]: crate::error::AnalysisError

mod categorical;
mod datetime;
mod numeric;
mod types;

pub use categorical::value_counts;
pub use types::{
    AnalysisKind, CategoricalStats, ColumnStats, DatetimeStats, DistributionSummary, ErrorStats,
    NumericStats, OutlierSummary,
};

pub(crate) use types::percentage;

use crate::config::Thresholds;

/// Computes descriptive statistics, outliers and distribution tests.
#[derive(Debug, Clone, Default)]
pub struct StatisticalAnalyzer {
    thresholds: Thresholds,
}

impl StatisticalAnalyzer {
    /// Create an analyzer with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with the given thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}
