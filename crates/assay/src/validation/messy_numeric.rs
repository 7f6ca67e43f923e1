//! Detection of string columns that are numeric apart from a few stray values.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};
use crate::input::coerce::to_number;
use crate::input::{DType, Dataset};

/// Maximum distinct failing values kept per column.
const MAX_SAMPLE_ERRORS: usize = 10;

/// A column whose values mostly, but not entirely, parse as the expected type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValidationIssue {
    /// Column with the inconsistency.
    pub column_name: String,
    /// Type the column appears to hold.
    pub expected_type: String,
    /// Fraction of non-null values that failed to parse, in [0, 1].
    pub error_rate: f64,
    /// Number of non-null values that failed to parse.
    pub error_count: usize,
    /// Distinct failing values in first-seen order.
    pub sample_errors: Vec<String>,
}

impl fmt::Display for ColumnValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, error rate {:.2}% ({} values)",
            self.column_name,
            self.expected_type,
            self.error_rate * 100.0,
            self.error_count
        )?;
        if !self.sample_errors.is_empty() {
            let samples: Vec<String> = self
                .sample_errors
                .iter()
                .take(5)
                .map(|s| format!("{s:?}"))
                .collect();
            write!(f, "; samples: {}", samples.join(", "))?;
        }
        Ok(())
    }
}

/// Flags object columns contaminated by a small share of non-numeric text.
#[derive(Debug, Clone)]
pub struct DataValidator {
    threshold: f64,
}

impl DataValidator {
    /// Create a validator that tolerates up to `threshold` non-numeric values.
    ///
    /// The threshold is a fraction and must lie in [0, 1].
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AssayError::Config(
                "threshold must be between 0 and 1".to_string(),
            ));
        }
        Ok(Self { threshold })
    }

    /// Configured tolerance.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Fail with every issue found, or succeed if the dataset is clean.
    pub fn validate_dataset(&self, dataset: &Dataset) -> Result<()> {
        let issues = self.detect_issues(dataset);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(AssayError::Validation { issues })
        }
    }

    /// Find messy numeric columns.
    ///
    /// A column qualifies when it is stored as objects, at least `1 - threshold`
    /// of its non-null values parse as numbers, and at least one does not.
    pub fn detect_issues(&self, dataset: &Dataset) -> Vec<ColumnValidationIssue> {
        let mut issues = Vec::new();

        for column in dataset.columns() {
            if column.dtype() != DType::Object {
                continue;
            }

            let non_null: Vec<_> = column.non_null().collect();
            if non_null.is_empty() {
                continue;
            }

            let failures: Vec<_> = non_null
                .iter()
                .filter(|v| to_number(v).is_none())
                .collect();
            let failure_count = failures.len();
            let failure_rate = failure_count as f64 / non_null.len() as f64;

            if 1.0 - failure_rate >= 1.0 - self.threshold && failure_count > 0 {
                let mut seen = HashSet::new();
                let sample_errors = failures
                    .iter()
                    .map(|v| v.to_string())
                    .filter(|s| seen.insert(s.clone()))
                    .take(MAX_SAMPLE_ERRORS)
                    .collect();

                issues.push(ColumnValidationIssue {
                    column_name: column.name().to_string(),
                    expected_type: "numeric (int/float)".to_string(),
                    error_rate: failure_rate,
                    error_count: failure_count,
                    sample_errors,
                });
            }
        }

        issues
    }
}

impl Default for DataValidator {
    fn default() -> Self {
        Self { threshold: 0.05 }
    }
}
