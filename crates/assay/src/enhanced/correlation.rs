//! Correlation of numeric columns with a target.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{numeric_at, EnhancedAnalyzer};
use crate::input::{Column, Dataset};
use crate::serde_ext::{nan_sentinel, nan_sentinel_map};
use crate::stats::{cmp_abs_desc, pearson};

/// One feature's correlation with the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub column: String,
    #[serde(with = "nan_sentinel")]
    pub correlation: f64,
}

/// Correlations with one numeric target, bucketed by strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCorrelation {
    /// Pearson r per numeric feature, in column order.
    #[serde(with = "nan_sentinel_map")]
    pub correlations: IndexMap<String, f64>,
    /// Each bucket is sorted by |r| descending; undefined correlations sort last.
    pub strong: Vec<CorrelationEntry>,
    pub moderate: Vec<CorrelationEntry>,
    pub weak: Vec<CorrelationEntry>,
}

/// Pearson r over rows where both columns are present.
fn pairwise_pearson(a: &Column, b: &Column) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..a.len())
        .filter_map(|row| Some((numeric_at(a, row)?, numeric_at(b, row)?)))
        .unzip();
    pearson(&xs, &ys)
}

impl EnhancedAnalyzer {
    /// Correlate each numeric target with every other numeric column.
    ///
    /// Targets that are missing or not integer/float columns are skipped.
    pub fn analyze_target_correlation(
        &self,
        dataset: &Dataset,
        targets: &[String],
    ) -> IndexMap<String, TargetCorrelation> {
        let thresholds = self.thresholds();
        let mut results = IndexMap::new();

        for target in targets {
            let Some(target_col) = dataset.column(target) else {
                warn!(target_column = %target, "target column not found, skipping correlation");
                continue;
            };
            if !target_col.dtype().is_numeric() {
                warn!(
                    target_column = %target,
                    dtype = %target_col.dtype(),
                    "target is not numeric, skipping correlation"
                );
                continue;
            }

            let correlations: IndexMap<String, f64> = dataset
                .columns()
                .iter()
                .filter(|c| c.name() != target && c.dtype().is_numeric())
                .map(|c| (c.name().to_string(), pairwise_pearson(target_col, c)))
                .collect();

            let mut entries: Vec<CorrelationEntry> = correlations
                .iter()
                .map(|(column, &correlation)| CorrelationEntry {
                    column: column.clone(),
                    correlation,
                })
                .collect();
            entries.sort_by(|a, b| cmp_abs_desc(a.correlation, b.correlation));

            let (mut strong, mut moderate, mut weak) = (Vec::new(), Vec::new(), Vec::new());
            for entry in entries {
                let r = entry.correlation.abs();
                if r >= thresholds.correlation_strong {
                    strong.push(entry);
                } else if r >= thresholds.correlation_moderate {
                    moderate.push(entry);
                } else {
                    weak.push(entry);
                }
            }

            results.insert(
                target.clone(),
                TargetCorrelation {
                    correlations,
                    strong,
                    moderate,
                    weak,
                },
            );
        }

        results
    }
}
