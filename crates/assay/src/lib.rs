//! Assay: automated exploratory profiling for tabular datasets.
//!
//! Assay looks at every column of a table, works out what kind of data it
//! holds, runs the matching statistical battery and turns the numbers into
//! cleaning recommendations.
//!
//! # Core Principles
//!
//! - **Non-destructive**: Input data is never modified; conversion works on a copy
//! - **Failure-isolated**: A column that cannot be analyzed becomes an error entry,
//!   not an aborted run
//! - **Deterministic**: The same dataset and configuration give the same result
//!
//! # Example
//!
//! ```no_run
//! use assay::{Profiler, ProfilerConfig};
//!
//! let config = ProfilerConfig::default().with_targets(["price"]);
//! let profiler = Profiler::with_config(config).unwrap();
//! let result = profiler.profile_path("listings.csv", None).unwrap();
//!
//! println!("Columns: {}", result.columns.len());
//! for rec in &result.general_recommendations {
//!     println!("{rec}");
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod conversion;
pub mod enhanced;
pub mod error;
pub mod inference;
pub mod input;
pub mod recommendation;
pub mod stats;
pub mod validation;

mod profiler;
mod serde_ext;

pub use crate::profiler::{
    ColumnAnalysis, DatasetInfo, IdUniquenessReport, Profiler, ProfilingResult,
};
pub use analysis::{ColumnStats, StatisticalAnalyzer};
pub use config::{ConversionMode, ProfilerConfig, Thresholds};
pub use conversion::{ConversionOutcome, ConversionReport, TypeConverter};
pub use enhanced::{EnhancedAnalysisResult, EnhancedAnalyzer};
pub use error::{AnalysisError, AssayError, ErrorCode, Result};
pub use inference::{SemanticType, TypeInferenceEngine, TypeInferenceResult};
pub use input::{Column, DType, Dataset, Parser, ParserConfig, Scalar, SourceMetadata};
pub use recommendation::{Language, Recommendation, RecommendationEngine};
pub use validation::{ColumnValidationIssue, DataValidator};
