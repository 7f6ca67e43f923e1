//! Input parsing and the in-memory dataset model.

pub mod coerce;
mod dataset;
mod parser;
mod source;

pub use dataset::{format_float, Column, DType, Dataset, Scalar, DATETIME_DISPLAY_FORMAT};
pub use parser::{Parser, ParserConfig};
pub use source::{is_null_value, SourceMetadata};
