//! Input validation run before profiling.

mod messy_numeric;

pub use messy_numeric::{ColumnValidationIssue, DataValidator};
