//! Conversion reports and their summaries.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::serde_ext::nan_sentinel;

/// Storage type a conversion aims for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionTarget {
    Float,
    Datetime,
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConversionTarget::Float => "float",
            ConversionTarget::Datetime => "datetime",
        })
    }
}

/// Where a column landed for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionBucket {
    Convertible,
    PartiallyConvertible,
    Unconvertible,
    AlreadyTyped,
}

/// Details of a column that converted with some failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialConversion {
    /// `valid_count / total_count`; nulls count as failures.
    #[serde(with = "nan_sentinel")]
    pub success_rate: f64,
    pub valid_count: usize,
    pub total_count: usize,
    /// Up to three non-null values that failed to convert.
    pub invalid_examples: Vec<String>,
}

/// Four-way partition of columns for one conversion target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub target: ConversionTarget,
    pub convertible_columns: Vec<String>,
    pub partially_convertible_columns: IndexMap<String, PartialConversion>,
    pub unconvertible_columns: Vec<String>,
    pub already_typed_columns: Vec<String>,
}

impl ConversionReport {
    /// Empty report for a target.
    pub fn new(target: ConversionTarget) -> Self {
        Self {
            target,
            convertible_columns: Vec::new(),
            partially_convertible_columns: IndexMap::new(),
            unconvertible_columns: Vec::new(),
            already_typed_columns: Vec::new(),
        }
    }

    /// Number of columns across all buckets.
    pub fn total_columns(&self) -> usize {
        self.convertible_columns.len()
            + self.partially_convertible_columns.len()
            + self.unconvertible_columns.len()
            + self.already_typed_columns.len()
    }

    /// Bucket holding `column`, if any.
    pub fn bucket_of(&self, column: &str) -> Option<ConversionBucket> {
        let has = |list: &[String]| list.iter().any(|c| c == column);
        if has(&self.convertible_columns) {
            Some(ConversionBucket::Convertible)
        } else if self.partially_convertible_columns.contains_key(column) {
            Some(ConversionBucket::PartiallyConvertible)
        } else if has(&self.unconvertible_columns) {
            Some(ConversionBucket::Unconvertible)
        } else if has(&self.already_typed_columns) {
            Some(ConversionBucket::AlreadyTyped)
        } else {
            None
        }
    }

    /// Summarize the report with rates and follow-up suggestions.
    pub fn analyze(&self) -> ConversionAnalysis {
        let total = self.total_columns();
        let full = self.convertible_columns.len();
        let partial = self.partially_convertible_columns.len();
        let unconvertible = self.unconvertible_columns.len();
        let rate = |n: usize| if total > 0 { n as f64 / total as f64 } else { 0.0 };

        let (target_noun, keep_phrase) = match self.target {
            ConversionTarget::Float => ("numeric", "categorical columns as text for categorical analysis"),
            ConversionTarget::Datetime => ("datetime", "columns in their current type"),
        };

        let mut recommendations = Vec::new();
        if full > 0 {
            recommendations.push(format!(
                "Consider converting {full} columns to {target_noun} for better analysis"
            ));
        }
        if partial > 0 {
            recommendations.push(format!(
                "Review {partial} partially convertible columns for data quality issues"
            ));
        }
        if unconvertible > 0 {
            recommendations.push(format!("Keep {unconvertible} {keep_phrase}"));
        }

        ConversionAnalysis {
            total_columns: total,
            conversion_success_rate: rate(full + partial),
            fully_convertible_rate: rate(full),
            recommendations,
        }
    }
}

/// Aggregate view of a conversion report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionAnalysis {
    pub total_columns: usize,
    /// Share of columns fully or partially convertible.
    pub conversion_success_rate: f64,
    /// Share of columns fully convertible.
    pub fully_convertible_rate: f64,
    pub recommendations: Vec<String>,
}
