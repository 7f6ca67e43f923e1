//! Target distribution and class balance.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::EnhancedAnalyzer;
use crate::analysis::{
    percentage, value_counts, AnalysisKind, CategoricalStats, ErrorStats, NumericStats,
};
use crate::input::{Column, Dataset};
use crate::serde_ext::nan_sentinel;

/// How evenly a categorical target's classes are represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBalance {
    /// Share of rows in the most frequent class, nulls included in the base.
    #[serde(with = "nan_sentinel")]
    pub largest_class_percentage: f64,
    #[serde(with = "nan_sentinel")]
    pub smallest_class_percentage: f64,
    pub is_balanced: bool,
    /// Largest class count over smallest class count.
    #[serde(with = "nan_sentinel")]
    pub imbalance_ratio: f64,
}

/// Categorical statistics of a target plus its class balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTarget {
    pub stats: CategoricalStats,
    /// Absent when the target has no non-null values.
    pub class_balance: Option<ClassBalance>,
}

/// Distribution of one target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetDistribution {
    Numeric(NumericStats),
    Categorical(CategoricalTarget),
    Error(ErrorStats),
}

impl EnhancedAnalyzer {
    /// Describe the distribution of each target.
    ///
    /// Numeric and boolean targets get the numeric battery; anything else
    /// gets the categorical battery and a class balance summary.
    pub fn analyze_target_distribution(
        &self,
        dataset: &Dataset,
        targets: &[String],
    ) -> IndexMap<String, TargetDistribution> {
        let mut results = IndexMap::new();

        for target in targets {
            let Some(column) = dataset.column(target) else {
                warn!(target_column = %target, "target column not found, skipping distribution");
                continue;
            };

            let distribution = if column.dtype().is_numeric_like() {
                match self.analyzer.analyze_numeric(column) {
                    Ok(stats) => TargetDistribution::Numeric(stats),
                    Err(err) => TargetDistribution::Error(ErrorStats::new(
                        err,
                        Some(AnalysisKind::Numeric),
                        column.len(),
                        column.null_count(),
                    )),
                }
            } else {
                TargetDistribution::Categorical(CategoricalTarget {
                    stats: self.analyzer.analyze_categorical(column),
                    class_balance: self.class_balance(column),
                })
            };

            results.insert(target.clone(), distribution);
        }

        results
    }

    fn class_balance(&self, column: &Column) -> Option<ClassBalance> {
        let counts = value_counts(column.non_null());
        let largest = counts.values().copied().max()?;
        let smallest = counts.values().copied().min()?;
        let largest_class_percentage = percentage(largest, column.len());

        Some(ClassBalance {
            largest_class_percentage,
            smallest_class_percentage: percentage(smallest, column.len()),
            is_balanced: largest_class_percentage < self.thresholds().balanced_class_percentage,
            imbalance_ratio: largest as f64 / smallest as f64,
        })
    }
}
