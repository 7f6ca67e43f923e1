//! Recommendation types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a recommendation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCode {
    /// Analysis of the column failed.
    AnalysisError,
    HighMissing,
    ZscoreOutliers,
    IqrOutliers,
    HighSkewness,
    NonNormal,
    HighVariability,
    HighCardinality,
    RareCategories,
    ImbalancedCategories,
    WideDateRange,
    /// Always emitted for datetime columns.
    DatetimeFeatures,
    SmallDataset,
    LargeDataset,
    HighMemory,
    DuplicateRows,
}

impl RecommendationCode {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationCode::AnalysisError => "Analysis Error",
            RecommendationCode::HighMissing => "High Missing Values",
            RecommendationCode::ZscoreOutliers => "Z-score Outliers",
            RecommendationCode::IqrOutliers => "IQR Outliers",
            RecommendationCode::HighSkewness => "High Skewness",
            RecommendationCode::NonNormal => "Not Normally Distributed",
            RecommendationCode::HighVariability => "High Variability",
            RecommendationCode::HighCardinality => "High Cardinality",
            RecommendationCode::RareCategories => "Rare Categories",
            RecommendationCode::ImbalancedCategories => "Imbalanced Categories",
            RecommendationCode::WideDateRange => "Wide Date Range",
            RecommendationCode::DatetimeFeatures => "Datetime Features",
            RecommendationCode::SmallDataset => "Small Dataset",
            RecommendationCode::LargeDataset => "Large Dataset",
            RecommendationCode::HighMemory => "High Memory Usage",
            RecommendationCode::DuplicateRows => "Duplicate Rows",
        }
    }
}

/// Output language for recommendation text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Zh,
}

/// A single bilingual recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub code: RecommendationCode,
    /// English text.
    pub message: String,
    /// Chinese text.
    pub message_zh: String,
}

impl Recommendation {
    pub fn new(
        code: RecommendationCode,
        message: impl Into<String>,
        message_zh: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            message_zh: message_zh.into(),
        }
    }

    /// Text in the requested language.
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::En => &self.message,
            Language::Zh => &self.message_zh,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
