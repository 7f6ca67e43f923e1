//! Rule-based recommendation generation from column statistics.
//!
//! Each battery has its own rule set. Rules fire independently and in a
//! fixed order, so the output for a given statistics record is stable.

use crate::analysis::{CategoricalStats, ColumnStats, DatetimeStats, ErrorStats, NumericStats};
use crate::config::Thresholds;
use crate::profiler::DatasetInfo;

use super::{Recommendation, RecommendationCode};

/// Generates recommendations using threshold rules.
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Recommendations for any column result.
    ///
    /// Failed analyses yield a single error recommendation; columns that
    /// matched no specific battery yield none.
    pub fn for_column(stats: &ColumnStats, thresholds: &Thresholds) -> Vec<Recommendation> {
        match stats {
            ColumnStats::Numeric(s) => Self::numeric(s, thresholds),
            ColumnStats::Categorical(s) => Self::categorical(s, thresholds),
            ColumnStats::Datetime(s) => Self::datetime(s, thresholds),
            ColumnStats::Other(_) => Vec::new(),
            ColumnStats::Error(e) => vec![Self::analysis_error(e)],
        }
    }

    /// The one recommendation for a failed analysis.
    pub fn analysis_error(error: &ErrorStats) -> Recommendation {
        Recommendation::new(
            RecommendationCode::AnalysisError,
            format!("Analysis error: {}", error.error),
            format!("分析错误: {}", error.error),
        )
    }

    /// Numeric column rules.
    pub fn numeric(stats: &NumericStats, thresholds: &Thresholds) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if stats.missing_percentage > thresholds.missing_percentage {
            let pct = stats.missing_percentage;
            recs.push(Recommendation::new(
                RecommendationCode::HighMissing,
                format!("High missing values ({pct:.1}%). Consider imputation with median or advanced methods."),
                format!("高缺失值 ({pct:.1}%)，建议使用中位数插值或高级方法进行处理"),
            ));
        }

        let outliers = &stats.outliers;
        if outliers.zscore_outliers > 0 {
            let n = outliers.zscore_outliers;
            recs.push(Recommendation::new(
                RecommendationCode::ZscoreOutliers,
                format!("Found {n} outliers using Z-score method. Consider investigation or removal."),
                format!("使用Z-score方法发现 {n} 个异常值，建议进行调查或删除处理"),
            ));
        }
        if outliers.iqr_outliers > 0 {
            let n = outliers.iqr_outliers;
            recs.push(Recommendation::new(
                RecommendationCode::IqrOutliers,
                format!("Found {n} outliers using IQR method. Consider winsorization or transformation."),
                format!("使用IQR方法发现 {n} 个异常值，建议进行缩尾处理或转换"),
            ));
        }

        if stats.skewness.abs() > thresholds.skewness {
            let skew = stats.skewness;
            recs.push(Recommendation::new(
                RecommendationCode::HighSkewness,
                format!("High skewness ({skew:.2}). Consider log transformation or Box-Cox transformation."),
                format!("高偏度 ({skew:.2})，建议进行对数变换或Box-Cox变换"),
            ));
        }

        // Only a completed test that rejected normality counts.
        if stats.distribution.is_normal == Some(false) {
            recs.push(Recommendation::new(
                RecommendationCode::NonNormal,
                "Data is not normally distributed. Consider transformation for parametric tests.",
                "数据非正态分布，参数检验时建议进行变换处理",
            ));
        }

        if stats.coefficient_of_variation > thresholds.coefficient_of_variation {
            let cv = stats.coefficient_of_variation;
            recs.push(Recommendation::new(
                RecommendationCode::HighVariability,
                format!("High variability (CV = {cv:.2}). Consider normalization or standardization."),
                format!("高变异性 (CV = {cv:.2})，建议进行标准化或归一化处理"),
            ));
        }

        recs
    }

    /// Categorical column rules.
    pub fn categorical(stats: &CategoricalStats, thresholds: &Thresholds) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if stats.missing_percentage > thresholds.missing_percentage {
            let pct = stats.missing_percentage;
            recs.push(Recommendation::new(
                RecommendationCode::HighMissing,
                format!("High missing values ({pct:.1}%). Consider creating 'Unknown' category or mode imputation."),
                format!("高缺失值 ({pct:.1}%)，建议创建'未知'类别或使用众数填充"),
            ));
        }

        if stats.is_high_cardinality {
            let n = stats.unique_count;
            recs.push(Recommendation::new(
                RecommendationCode::HighCardinality,
                format!("High cardinality ({n} unique values). Consider grouping rare categories or target encoding."),
                format!("高基数 ({n} 个唯一值)，建议对稀有类别进行分组或使用目标编码"),
            ));
        }

        if !stats.rare_categories.is_empty() {
            let n = stats.rare_categories.len();
            recs.push(Recommendation::new(
                RecommendationCode::RareCategories,
                format!("Found {n} rare categories. Consider grouping into 'Other' category."),
                format!("发现 {n} 个稀有类别，建议分组为'其他'类别"),
            ));
        }

        if stats.value_counts.len() > 1 {
            let max = stats.value_counts.values().copied().max().unwrap_or(0);
            let min = stats.value_counts.values().copied().min().unwrap_or(0);
            if min > 0 && max as f64 / min as f64 > thresholds.imbalance_ratio {
                recs.push(Recommendation::new(
                    RecommendationCode::ImbalancedCategories,
                    "Highly imbalanced categories. Consider resampling or weighting for modeling.",
                    "类别高度不平衡，建模时建议考虑重采样或加权处理",
                ));
            }
        }

        recs
    }

    /// Datetime column rules.
    pub fn datetime(stats: &DatetimeStats, thresholds: &Thresholds) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if stats.missing_percentage > thresholds.missing_percentage {
            let pct = stats.missing_percentage;
            recs.push(Recommendation::new(
                RecommendationCode::HighMissing,
                format!("High missing values ({pct:.1}%). Consider forward-fill or interpolation."),
                format!("高缺失值 ({pct:.1}%)，建议使用前向填充或插值处理"),
            ));
        }

        if stats.year_range > thresholds.year_range {
            recs.push(Recommendation::new(
                RecommendationCode::WideDateRange,
                "Wide date range. Verify if all dates are valid and consider filtering outliers.",
                "日期范围过宽，请验证所有日期的有效性并考虑过滤异常值",
            ));
        }

        recs.push(Recommendation::new(
            RecommendationCode::DatetimeFeatures,
            "Consider extracting features: year, month, day, weekday, season, quarter.",
            "建议提取特征：年、月、日、星期、季节、季度",
        ));

        recs
    }

    /// Dataset-wide rules.
    pub fn general(info: &DatasetInfo, thresholds: &Thresholds) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        let rows = info.shape.0;

        if rows < thresholds.small_dataset_rows {
            recs.push(Recommendation::new(
                RecommendationCode::SmallDataset,
                "Small dataset. Consider collecting more data for robust analysis.",
                "数据集较小，建议收集更多数据以进行稳健分析",
            ));
        }
        if rows > thresholds.large_dataset_rows {
            recs.push(Recommendation::new(
                RecommendationCode::LargeDataset,
                "Large dataset. Consider sampling or chunking for memory efficiency.",
                "大数据集，建议使用采样或分块处理以提高内存效率",
            ));
        }

        if info.memory_usage_mb > thresholds.memory_mb {
            let mb = info.memory_usage_mb;
            recs.push(Recommendation::new(
                RecommendationCode::HighMemory,
                format!("High memory usage ({mb:.1} MB). Consider optimizing data types or processing in chunks."),
                format!("高内存使用 ({mb:.1} MB)，建议优化数据类型或分块处理"),
            ));
        }

        if info.duplicate_count > 0 {
            let n = info.duplicate_count;
            recs.push(Recommendation::new(
                RecommendationCode::DuplicateRows,
                format!("Found {n} duplicate rows. Consider removing duplicates."),
                format!("发现 {n} 个重复行，建议删除重复数据"),
            ));
        }

        recs
    }
}
