//! Statistical kernels used by the analyzers.
//!
//! Everything here works on plain `f64` slices with nulls already removed.
//! Conventions follow the usual dataframe and scientific-Python defaults:
//! sample (ddof = 1) variance, linearly interpolated quantiles, bias-adjusted
//! skewness and excess kurtosis.

mod contingency;
mod descriptive;
mod normality;

pub use contingency::{chi2_contingency, ChiSquareTest};
pub use descriptive::{
    central_moment, kurtosis, mean, median, median_absolute_deviation, mode, pearson, quantile,
    skewness, sorted, std_dev, variance,
};
pub use normality::{dagostino_pearson, shapiro_wilk, NormalityTest};

pub(crate) use descriptive::cmp_abs_desc;

use thiserror::Error;

/// Why a statistical test could not produce a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// The test needs more observations than were supplied.
    #[error("at least {needed} observations required, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    /// All observations are equal.
    #[error("data has range zero")]
    ZeroRange,

    /// The contingency table has no observations.
    #[error("no data; observed table is empty")]
    EmptyTable,

    /// A cell of the expected-frequency table is zero.
    #[error("the internally computed table of expected frequencies has a zero element at ({row}, {column})")]
    ZeroExpected { row: usize, column: usize },

    /// A reference distribution could not be constructed.
    #[error("distribution error: {0}")]
    Distribution(String),
}
