//! Categorical column battery.

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::types::{percentage, CategoricalStats};
use super::StatisticalAnalyzer;
use crate::input::{Column, Scalar};

/// Number of most frequent values reported.
const TOP_VALUES: usize = 10;

/// Count occurrences of each non-null value, most frequent first.
///
/// Values are keyed by their display text. Ties keep first-appearance order.
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a Scalar>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

/// Most frequent value; ties resolve to the smallest value.
fn mode_of(column: &Column) -> Option<String> {
    let mut tally: IndexMap<String, (&Scalar, usize)> = IndexMap::new();
    for value in column.non_null() {
        tally.entry(value.to_string()).or_insert((value, 0)).1 += 1;
    }
    tally
        .into_iter()
        .max_by(|(_, (va, ca)), (_, (vb, cb))| match ca.cmp(cb) {
            Ordering::Equal => vb.total_cmp(va),
            other => other,
        })
        .map(|(key, _)| key)
}

impl StatisticalAnalyzer {
    /// Analyze a categorical column.
    ///
    /// Never fails. `count` includes nulls so `cardinality` and the value
    /// percentages are relative to the full column length.
    pub fn analyze_categorical(&self, column: &Column) -> CategoricalStats {
        let count = column.len();
        let missing_count = column.null_count();
        let non_null = count - missing_count;

        let all_counts = value_counts(column.non_null());
        let unique_count = all_counts.len();

        let rare_categories = all_counts
            .iter()
            .filter(|&(_, &c)| (c as f64 / non_null as f64) < self.thresholds.rare_category)
            .map(|(value, _)| value.clone())
            .collect();

        let value_counts: IndexMap<String, usize> = all_counts
            .into_iter()
            .take(TOP_VALUES)
            .collect();
        let value_percentages = value_counts
            .iter()
            .map(|(value, &c)| (value.clone(), percentage(c, count)))
            .collect();

        CategoricalStats {
            count,
            missing_count,
            missing_percentage: percentage(missing_count, count),
            unique_count,
            cardinality: if count == 0 {
                f64::NAN
            } else {
                unique_count as f64 / count as f64
            },
            mode: mode_of(column),
            value_counts,
            value_percentages,
            rare_categories,
            is_high_cardinality: unique_count > self.thresholds.high_cardinality,
        }
    }
}
