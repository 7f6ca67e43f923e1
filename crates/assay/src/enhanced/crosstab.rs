//! Categorical features cross-tabulated against a target.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::EnhancedAnalyzer;
use crate::error::{AnalysisError, ErrorCode};
use crate::input::{Column, Dataset, Scalar};
use crate::stats::{chi2_contingency, ChiSquareTest};

/// Crosstab of one feature against the target, with an independence test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosstabResult {
    /// Feature value, then target value: share of the feature row in percent.
    pub percentages: IndexMap<String, IndexMap<String, f64>>,
    /// Feature value, then target value: raw co-occurrence counts.
    pub counts: IndexMap<String, IndexMap<String, usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chi_square: Option<ChiSquareTest>,
    /// `p < alpha`; absent when the test failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_significant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chi_square_error: Option<AnalysisError>,
}

/// Distinct values in ascending order, keyed by display text.
fn sorted_keys<'a>(values: impl Iterator<Item = &'a Scalar>) -> Vec<String> {
    let mut distinct: IndexMap<String, &Scalar> = IndexMap::new();
    for value in values {
        distinct.entry(value.to_string()).or_insert(value);
    }
    distinct.sort_by(|ka, va, kb, vb| match va.total_cmp(vb) {
        Ordering::Equal => ka.cmp(kb),
        other => other,
    });
    distinct.into_keys().collect()
}

impl EnhancedAnalyzer {
    /// Cross-tabulate categorical features against `target`.
    ///
    /// Without explicit `features`, every object or categorical column other
    /// than the target is used. Rows where either side is null are left out.
    pub fn analyze_categorical_by_target(
        &self,
        dataset: &Dataset,
        target: &str,
        features: Option<&[String]>,
    ) -> IndexMap<String, CrosstabResult> {
        let mut results = IndexMap::new();
        let Some(target_col) = dataset.column(target) else {
            warn!(target_column = target, "target column not found, skipping crosstab");
            return results;
        };

        let candidates: Vec<&Column> = match features {
            Some(names) => names
                .iter()
                .filter(|n| n.as_str() != target)
                .filter_map(|n| {
                    let column = dataset.column(n);
                    if column.is_none() {
                        warn!(feature = %n, "feature column not found, skipping crosstab");
                    }
                    column
                })
                .collect(),
            None => dataset
                .columns()
                .iter()
                .filter(|c| c.name() != target && c.dtype().is_string_like())
                .collect(),
        };

        for feature in candidates {
            debug!(feature = feature.name(), target_column = target, "crosstab");
            results.insert(feature.name().to_string(), self.crosstab(feature, target_col));
        }
        results
    }

    fn crosstab(&self, feature: &Column, target: &Column) -> CrosstabResult {
        let pairs: Vec<(&Scalar, &Scalar)> = (0..feature.len())
            .filter_map(|row| Some((feature.get(row)?, target.get(row)?)))
            .collect();

        let row_keys = sorted_keys(pairs.iter().map(|(f, _)| *f));
        let col_keys = sorted_keys(pairs.iter().map(|(_, t)| *t));

        let mut counts: IndexMap<String, IndexMap<String, usize>> = row_keys
            .iter()
            .map(|r| (r.clone(), col_keys.iter().map(|c| (c.clone(), 0)).collect()))
            .collect();
        for (f, t) in &pairs {
            if let Some(cell) = counts
                .get_mut(&f.to_string())
                .and_then(|row| row.get_mut(&t.to_string()))
            {
                *cell += 1;
            }
        }

        let percentages = counts
            .iter()
            .map(|(r, row)| {
                let total: usize = row.values().sum();
                let shares = row
                    .iter()
                    .map(|(c, &n)| (c.clone(), n as f64 / total as f64 * 100.0))
                    .collect();
                (r.clone(), shares)
            })
            .collect();

        let observed: Vec<Vec<f64>> = counts
            .values()
            .map(|row| row.values().map(|&n| n as f64).collect())
            .collect();

        let (chi_square, is_significant, chi_square_error) = match chi2_contingency(&observed) {
            Ok(test) => {
                let significant = test.p_value < self.thresholds().chi_square_alpha;
                (Some(test), Some(significant), None)
            }
            Err(e) => (None, None, Some(AnalysisError::new(ErrorCode::ChiSquare, e.to_string()))),
        };

        CrosstabResult {
            percentages,
            counts,
            chi_square,
            is_significant,
            chi_square_error,
        }
    }
}
