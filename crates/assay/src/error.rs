//! Error types for the assay library.
//!
//! Two kinds of failure exist. [`AssayError`] is returned for precondition
//! and I/O failures that stop a call outright. [`AnalysisError`] is embedded
//! in analysis results for data-dependent failures (an all-null column, a
//! chi-square test on a degenerate table) so that one bad column never aborts
//! a profiling run.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ColumnValidationIssue;

/// Main error type for assay operations.
#[derive(Debug, Error)]
pub enum AssayError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing CSV/TSV data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Columns of a dataset disagree on length or names collide.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Requested columns are not in the dataset.
    #[error("Column(s) not found: {}", columns.join(", "))]
    ColumnNotFound { columns: Vec<String> },

    /// Configuration error (bad threshold, unreadable config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation found columns with type inconsistencies.
    #[error("Data validation failed: {} column(s) have type inconsistencies", issues.len())]
    Validation { issues: Vec<ColumnValidationIssue> },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for assay operations.
pub type Result<T> = std::result::Result<T, AssayError>;

/// Machine-readable category of an embedded analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No value in the column survived null-dropping or coercion.
    NoValidValues,
    /// A column had values but none of them parsed as a datetime.
    DatetimeParse,
    /// A chi-square independence test could not be computed.
    ChiSquare,
    /// A configured column does not exist in the dataset.
    ColumnNotFound,
    /// A composite key was requested with fewer than two columns.
    InsufficientColumns,
    /// Analysis of a column aborted unexpectedly.
    ColumnPanic,
}

/// A data-dependent failure recorded inside a result instead of raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisError {
    /// Failure category.
    pub code: ErrorCode,
    /// Human-readable message, reported verbatim by renderers.
    pub message: String,
}

impl AnalysisError {
    /// Create a new embedded error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
