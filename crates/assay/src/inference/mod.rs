//! Semantic type inference for columns.

mod engine;
mod patterns;

pub use engine::{
    BaselineType, SemanticType, TypeInferenceEngine, TypeInferenceResult,
    PATTERN_CONFIDENCE_THRESHOLD, SAMPLE_LIMIT,
};
pub use patterns::PatternKind;
