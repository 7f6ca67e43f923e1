//! Column type inference from storage type and value patterns.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::patterns::PatternKind;
use crate::input::{Column, DType, Scalar};

/// Maximum non-null values inspected per column.
pub const SAMPLE_LIMIT: usize = 1000;

/// Number of example values kept in the result.
const SAMPLE_VALUES: usize = 5;

/// Pattern score a column must exceed for the pattern to become its type.
pub const PATTERN_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// General shape of a column derived from its storage and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineType {
    Integer,
    Floating,
    #[serde(rename = "datetime64")]
    Datetime64,
    Boolean,
    Categorical,
    String,
    Mixed,
    Empty,
}

impl BaselineType {
    /// Classify a column.
    pub fn of(column: &Column) -> Self {
        match column.dtype() {
            DType::Int64 => BaselineType::Integer,
            DType::Float64 => BaselineType::Floating,
            DType::DateTime => BaselineType::Datetime64,
            DType::Boolean => BaselineType::Boolean,
            DType::Categorical => BaselineType::Categorical,
            DType::Object => {
                let mut values = column.non_null().peekable();
                if values.peek().is_none() {
                    BaselineType::Empty
                } else if values.all(|v| matches!(v, Scalar::Str(_))) {
                    BaselineType::String
                } else {
                    BaselineType::Mixed
                }
            }
        }
    }
}

/// Final semantic classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SemanticType {
    Numeric,
    Datetime,
    Boolean,
    Categorical,
    Text,
    /// A structured format matched by most values.
    Pattern(PatternKind),
}

impl SemanticType {
    /// Resolve the suggested type.
    ///
    /// A confident pattern wins; otherwise the baseline decides, with
    /// anything unrecognized falling back to text.
    pub fn resolve(baseline: BaselineType, best_pattern: PatternKind, confidence: f64) -> Self {
        if confidence > PATTERN_CONFIDENCE_THRESHOLD {
            return SemanticType::Pattern(best_pattern);
        }
        match baseline {
            BaselineType::Integer | BaselineType::Floating => SemanticType::Numeric,
            BaselineType::Datetime64 => SemanticType::Datetime,
            BaselineType::Boolean => SemanticType::Boolean,
            BaselineType::Categorical => SemanticType::Categorical,
            BaselineType::String | BaselineType::Mixed | BaselineType::Empty => {
                SemanticType::Text
            }
        }
    }

    /// Stable snake_case name; patterns use their own name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Datetime => "datetime",
            SemanticType::Boolean => "boolean",
            SemanticType::Categorical => "categorical",
            SemanticType::Text => "text",
            SemanticType::Pattern(p) => p.name(),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SemanticType> for String {
    fn from(value: SemanticType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for SemanticType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "numeric" => Ok(SemanticType::Numeric),
            "datetime" => Ok(SemanticType::Datetime),
            "boolean" => Ok(SemanticType::Boolean),
            "categorical" => Ok(SemanticType::Categorical),
            "text" => Ok(SemanticType::Text),
            other => PatternKind::from_name(other)
                .map(SemanticType::Pattern)
                .ok_or_else(|| format!("unknown semantic type '{other}'")),
        }
    }
}

/// Inference outcome for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInferenceResult {
    /// Shape derived from storage type.
    pub baseline: BaselineType,
    /// Highest scoring pattern, earliest declared on ties.
    pub best_pattern: PatternKind,
    /// Score of the best pattern.
    pub pattern_confidence: f64,
    /// Resolved semantic type.
    pub suggested_type: SemanticType,
    /// Fraction of sampled values matching each pattern, in declaration order.
    pub pattern_scores: IndexMap<PatternKind, f64>,
    /// Up to five stringified sample values.
    pub sample_values: Vec<String>,
}

/// Infers semantic types for columns.
#[derive(Debug, Clone, Default)]
pub struct TypeInferenceEngine;

impl TypeInferenceEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Infer the type of a column.
    pub fn infer(&self, column: &Column) -> TypeInferenceResult {
        let sample: Vec<String> = column
            .non_null()
            .take(SAMPLE_LIMIT)
            .map(ToString::to_string)
            .collect();

        let baseline = BaselineType::of(column);

        let pattern_scores: IndexMap<PatternKind, f64> = PatternKind::ALL
            .iter()
            .map(|&pattern| {
                let score = if sample.is_empty() {
                    0.0
                } else {
                    let matches = sample.iter().filter(|s| pattern.is_match(s)).count();
                    matches as f64 / sample.len() as f64
                };
                (pattern, score)
            })
            .collect();

        let (best_pattern, pattern_confidence) = best_of(&pattern_scores);
        let suggested_type = SemanticType::resolve(baseline, best_pattern, pattern_confidence);

        TypeInferenceResult {
            baseline,
            best_pattern,
            pattern_confidence,
            suggested_type,
            pattern_scores,
            sample_values: sample.into_iter().take(SAMPLE_VALUES).collect(),
        }
    }
}

/// Maximum score; strict comparison keeps the earliest pattern on ties.
fn best_of(scores: &IndexMap<PatternKind, f64>) -> (PatternKind, f64) {
    scores.iter().fold(
        (PatternKind::ALL[0], f64::NEG_INFINITY),
        |(best, best_score), (&pattern, &score)| {
            if score > best_score {
                (pattern, score)
            } else {
                (best, best_score)
            }
        },
    )
}
