//! ID column uniqueness checks.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::EnhancedAnalyzer;
use crate::analysis::percentage;
use crate::error::{AnalysisError, ErrorCode};
use crate::input::Dataset;
use crate::serde_ext::nan_sentinel;

/// Maximum duplicate values listed.
const MAX_DUPLICATES: usize = 10;

/// Separator between components of a composite key.
const KEY_SEPARATOR: &str = "||";

/// Text used for a null component of a composite key.
const NULL_KEY: &str = "nan";

/// How well a column (or key) identifies rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdUniqueness {
    pub total_count: usize,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// `total_count - unique_count`; nulls count as duplicates.
    pub duplicate_count: usize,
    #[serde(with = "nan_sentinel")]
    pub uniqueness_percentage: f64,
    pub is_unique: bool,
    /// Values seen more than once, in first-appearance order.
    pub duplicate_values: Vec<String>,
    /// Occurrences of the most repeated values, most frequent first.
    pub duplicate_value_counts: IndexMap<String, usize>,
    pub missing_count: usize,
    #[serde(with = "nan_sentinel")]
    pub missing_percentage: f64,
}

/// Uniqueness of a key built from several columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeIdUniqueness {
    pub composite_columns: Vec<String>,
    #[serde(flatten)]
    pub uniqueness: IdUniqueness,
}

/// Outcome of a uniqueness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdCheck<T> {
    Checked(T),
    Error(AnalysisError),
}

impl<T> IdCheck<T> {
    /// The successful result, if any.
    pub fn checked(&self) -> Option<&T> {
        match self {
            IdCheck::Checked(value) => Some(value),
            IdCheck::Error(_) => None,
        }
    }
}

/// Compute uniqueness over keys; `None` keys are missing.
fn uniqueness(keys: &[Option<String>], missing_count: usize) -> IdUniqueness {
    let total_count = keys.len();

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    let unique_count = counts.len();
    let duplicate_count = total_count - unique_count;

    let duplicate_values: Vec<String> = counts
        .iter()
        .filter(|&(_, &n)| n > 1)
        .take(MAX_DUPLICATES)
        .map(|(k, _)| k.to_string())
        .collect();

    let mut repeated: Vec<(&str, usize)> =
        counts.iter().filter(|&(_, &n)| n > 1).map(|(&k, &n)| (k, n)).collect();
    repeated.sort_by(|a, b| b.1.cmp(&a.1));
    let duplicate_value_counts = repeated
        .into_iter()
        .take(MAX_DUPLICATES)
        .map(|(k, n)| (k.to_string(), n))
        .collect();

    IdUniqueness {
        total_count,
        unique_count,
        duplicate_count,
        uniqueness_percentage: percentage(unique_count, total_count),
        is_unique: unique_count == total_count,
        duplicate_values,
        duplicate_value_counts,
        missing_count,
        missing_percentage: percentage(missing_count, total_count),
    }
}

impl EnhancedAnalyzer {
    /// Check each ID column on its own.
    pub fn check_id_uniqueness(
        &self,
        dataset: &Dataset,
        id_columns: &[String],
    ) -> IndexMap<String, IdCheck<IdUniqueness>> {
        id_columns
            .iter()
            .map(|name| {
                let check = match dataset.column(name) {
                    Some(column) => {
                        let keys = column.display_values();
                        IdCheck::Checked(uniqueness(&keys, column.null_count()))
                    }
                    None => {
                        warn!(column = %name, "ID column not found");
                        IdCheck::Error(AnalysisError::new(
                            ErrorCode::ColumnNotFound,
                            format!("Column '{name}' not found"),
                        ))
                    }
                };
                (name.clone(), check)
            })
            .collect()
    }

    /// Check the key formed by joining several columns.
    ///
    /// Null components render as `nan` in the key; a row with any null
    /// component counts as missing.
    pub fn check_composite_id_uniqueness(
        &self,
        dataset: &Dataset,
        id_columns: &[String],
    ) -> IdCheck<CompositeIdUniqueness> {
        if id_columns.len() < 2 {
            return IdCheck::Error(AnalysisError::new(
                ErrorCode::InsufficientColumns,
                "Composite ID requires at least 2 columns",
            ));
        }

        let missing: Vec<&String> = id_columns
            .iter()
            .filter(|name| dataset.column(name).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(columns = ?missing, "composite ID columns not found");
            return IdCheck::Error(AnalysisError::new(
                ErrorCode::ColumnNotFound,
                format!("Columns not found: {missing:?}"),
            ));
        }

        let columns: Vec<_> = id_columns.iter().filter_map(|n| dataset.column(n)).collect();
        let mut missing_count = 0;
        let keys: Vec<Option<String>> = (0..dataset.row_count())
            .map(|row| {
                let parts: Vec<String> = columns
                    .iter()
                    .map(|c| c.get(row).map_or_else(|| NULL_KEY.to_string(), ToString::to_string))
                    .collect();
                if columns.iter().any(|c| c.get(row).is_none()) {
                    missing_count += 1;
                }
                Some(parts.join(KEY_SEPARATOR))
            })
            .collect();

        IdCheck::Checked(CompositeIdUniqueness {
            composite_columns: id_columns.to_vec(),
            uniqueness: uniqueness(&keys, missing_count),
        })
    }
}
