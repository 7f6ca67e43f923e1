//! Best-effort conversion of columns to float and datetime storage.

mod converter;
mod report;

pub use converter::{ConversionOutcome, TypeConverter, DATETIME_FORMATS};
pub use report::{
    ConversionAnalysis, ConversionBucket, ConversionReport, ConversionTarget, PartialConversion,
};
