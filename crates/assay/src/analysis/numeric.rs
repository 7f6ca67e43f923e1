//! Numeric column battery.

use tracing::debug;

use super::types::{percentage, DistributionSummary, NumericStats, OutlierSummary};
use super::StatisticalAnalyzer;
use crate::error::{AnalysisError, ErrorCode};
use crate::input::Column;
use crate::stats::{self, NormalityTest, StatsError};

/// Consistency constant of the modified z-score.
const MODIFIED_Z_SCALE: f64 = 0.6745;

impl StatisticalAnalyzer {
    /// Analyze a numeric (or boolean) column.
    ///
    /// Nulls are dropped first; a column with nothing left is an error.
    pub fn analyze_numeric(&self, column: &Column) -> Result<NumericStats, AnalysisError> {
        let values = column.numeric_values();
        if values.is_empty() {
            return Err(AnalysisError::new(
                ErrorCode::NoValidValues,
                "No valid numeric values found",
            ));
        }

        let total = column.len();
        let missing_count = total - values.len();
        let sorted = stats::sorted(&values);

        let mean = stats::mean(&values);
        let std = stats::std_dev(&values, 1);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let q1 = stats::quantile(&sorted, 0.25);
        let q3 = stats::quantile(&sorted, 0.75);
        let skewness = stats::skewness(&values);
        let kurtosis = stats::kurtosis(&values);

        Ok(NumericStats {
            count: values.len(),
            missing_count,
            missing_percentage: percentage(missing_count, total),
            mean,
            median: stats::quantile(&sorted, 0.5),
            mode: stats::mode(&values),
            std,
            variance: stats::variance(&values, 1),
            min,
            max,
            range: max - min,
            q1,
            q3,
            iqr: q3 - q1,
            skewness,
            kurtosis,
            coefficient_of_variation: if mean != 0.0 { std / mean } else { f64::NAN },
            outliers: self.detect_outliers(&values, &sorted),
            distribution: self.analyze_distribution(column.name(), &values, skewness, kurtosis),
        })
    }

    /// Count outliers by z-score, IQR fences and modified z-score.
    fn detect_outliers(&self, values: &[f64], sorted: &[f64]) -> OutlierSummary {
        let t = &self.thresholds;
        let n = values.len();

        let mean = stats::mean(values);
        let pop_std = stats::std_dev(values, 0);
        let zscore_outliers = if pop_std > 0.0 {
            values
                .iter()
                .filter(|x| ((*x - mean) / pop_std).abs() > t.zscore)
                .count()
        } else {
            0
        };

        let q1 = stats::quantile(sorted, 0.25);
        let q3 = stats::quantile(sorted, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - t.iqr_multiplier * iqr;
        let upper = q3 + t.iqr_multiplier * iqr;
        let iqr_outliers = values.iter().filter(|&&x| x < lower || x > upper).count();

        let median = stats::quantile(sorted, 0.5);
        let mad = stats::median_absolute_deviation(values, median);
        let modified_zscore_outliers = if mad != 0.0 {
            values
                .iter()
                .filter(|x| (MODIFIED_Z_SCALE * (*x - median) / mad).abs() > t.modified_zscore)
                .count()
        } else {
            0
        };

        OutlierSummary {
            zscore_outliers,
            zscore_percentage: percentage(zscore_outliers, n),
            iqr_outliers,
            iqr_percentage: percentage(iqr_outliers, n),
            iqr_lower_bound: lower,
            iqr_upper_bound: upper,
            modified_zscore_outliers,
            modified_zscore_percentage: percentage(modified_zscore_outliers, n),
        }
    }

    /// Normality tests plus skew and tail flags.
    ///
    /// Once a test fails no further tests run; the failure is recorded.
    fn analyze_distribution(
        &self,
        column_name: &str,
        values: &[f64],
        skewness: f64,
        kurtosis: f64,
    ) -> DistributionSummary {
        let mut summary = DistributionSummary {
            shapiro: None,
            is_normal: None,
            dagostino: None,
            normality_test_error: None,
            is_skewed: skewness.abs() > 1.0,
            is_heavy_tailed: kurtosis > 3.0,
        };

        let run = |summary: &mut DistributionSummary| -> Result<(), StatsError> {
            if values.len() > 3 {
                let shapiro: NormalityTest = stats::shapiro_wilk(values)?;
                summary.is_normal = Some(shapiro.p_value > self.thresholds.normality_alpha);
                summary.shapiro = Some(shapiro);
            }
            if values.len() > 8 {
                summary.dagostino = Some(stats::dagostino_pearson(values)?);
            }
            Ok(())
        };

        if let Err(e) = run(&mut summary) {
            debug!(column = column_name, error = %e, "normality test failed");
            summary.normality_test_error = Some(e.to_string());
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;

    fn age_column() -> Column {
        Column::from_floats(
            "age",
            vec![Some(25.0), Some(30.0), None, Some(40.0), Some(200.0)],
        )
    }

    #[test]
    fn test_age_scenario() {
        let stats = StatisticalAnalyzer::new().analyze_numeric(&age_column()).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.missing_count, 1);
        assert_eq!(stats.missing_percentage, 20.0);
        assert!((stats.mean - 73.75).abs() < 1e-9);
        assert!((stats.median - 35.0).abs() < 1e-9);
        assert_eq!(stats.mode, Some(25.0));
        assert_eq!(stats.outliers.zscore_outliers, 0);
        assert_eq!(stats.min, 25.0);
        assert_eq!(stats.range, 175.0);
        assert!(stats.distribution.shapiro.is_some());
        assert!(stats.distribution.dagostino.is_none());
    }

    #[test]
    fn test_all_null_is_error() {
        let col = Column::from_floats("x", vec![None, None]);
        let err = StatisticalAnalyzer::new().analyze_numeric(&col).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoValidValues);
        assert_eq!(err.message, "No valid numeric values found");
    }

    #[test]
    fn test_constant_column() {
        let col = Column::from_ints("c", vec![Some(5); 10]);
        let stats = StatisticalAnalyzer::new().analyze_numeric(&col).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.outliers.zscore_outliers, 0);
        assert_eq!(stats.outliers.modified_zscore_outliers, 0);
        // Recorded as a test error rather than scipy's W=1, p=1.
        assert_eq!(
            stats.distribution.normality_test_error.as_deref(),
            Some("data has range zero")
        );
        assert_eq!(stats.distribution.is_normal, None);
        assert!(stats.distribution.shapiro.is_none());
        assert!(stats.distribution.dagostino.is_none());
    }

    #[test]
    fn test_single_value() {
        let col = Column::from_floats("x", vec![Some(3.0)]);
        let stats = StatisticalAnalyzer::new().analyze_numeric(&col).unwrap();
        assert_eq!(stats.count, 1);
        assert!(stats.std.is_nan());
        assert!(stats.distribution.shapiro.is_none());
        assert!(stats.distribution.normality_test_error.is_none());
    }

    #[test]
    fn test_zero_mean_has_nan_cv() {
        let col = Column::from_floats("x", vec![Some(-1.0), Some(1.0)]);
        let stats = StatisticalAnalyzer::new().analyze_numeric(&col).unwrap();
        assert!(stats.coefficient_of_variation.is_nan());
    }

    #[test]
    fn test_outlier_methods() {
        let mut values: Vec<Option<f64>> = (0..30).map(|i| Some(10.0 + (i % 5) as f64)).collect();
        values.push(Some(500.0));
        let col = Column::from_floats("x", values);
        let stats = StatisticalAnalyzer::new().analyze_numeric(&col).unwrap();
        assert_eq!(stats.outliers.zscore_outliers, 1);
        assert_eq!(stats.outliers.iqr_outliers, 1);
        assert_eq!(stats.outliers.modified_zscore_outliers, 1);
        assert!(stats.outliers.iqr_upper_bound < 500.0);
        assert!(stats.distribution.is_skewed);
        assert_eq!(stats.distribution.is_normal, Some(false));
    }

    #[test]
    fn test_lower_zscore_threshold_flags_more() {
        let col = age_column();
        let strict = StatisticalAnalyzer::with_thresholds(Thresholds {
            zscore: 1.0,
            ..Thresholds::default()
        });
        let stats = strict.analyze_numeric(&col).unwrap();
        assert_eq!(stats.outliers.zscore_outliers, 1);
    }

    #[test]
    fn test_booleans_are_zero_one() {
        let col = Column::from_bools("b", vec![Some(true), Some(false), Some(true), None]);
        let stats = StatisticalAnalyzer::new().analyze_numeric(&col).unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.mode, Some(1.0));
    }
}
