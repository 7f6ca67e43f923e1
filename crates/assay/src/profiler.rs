//! Main Profiler struct and public API.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{percentage, AnalysisKind, ColumnStats, ErrorStats, StatisticalAnalyzer};
use crate::config::{ConversionMode, ProfilerConfig};
use crate::conversion::{ConversionOutcome, TypeConverter};
use crate::enhanced::{
    CompositeIdUniqueness, EnhancedAnalysisResult, EnhancedAnalyzer, IdCheck, IdUniqueness,
};
use crate::error::{AnalysisError, AssayError, ErrorCode, Result};
use crate::inference::{SemanticType, TypeInferenceEngine, TypeInferenceResult};
use crate::input::{Column, DType, Dataset, Parser, SourceMetadata};
use crate::recommendation::{Recommendation, RecommendationEngine};
use crate::serde_ext::nan_sentinel;
use crate::validation::{ColumnValidationIssue, DataValidator};

/// Name used when the caller gives none.
const DEFAULT_DATASET_NAME: &str = "dataset";

/// Dataset-level facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    /// `(rows, columns)`.
    pub shape: (usize, usize),
    /// Estimated in-memory size.
    #[serde(with = "nan_sentinel")]
    pub memory_usage_mb: f64,
    pub total_missing: usize,
    /// Missing cells over all cells, in percent.
    #[serde(with = "nan_sentinel")]
    pub missing_percentage: f64,
    /// Rows that repeat an earlier row.
    pub duplicate_count: usize,
    /// Integer and float columns.
    pub numeric_columns: usize,
    /// Object and categorical columns.
    pub categorical_columns: usize,
    pub datetime_columns: usize,
    /// Object columns.
    pub text_columns: usize,
}

impl DatasetInfo {
    /// Summarize a dataset.
    pub fn from_dataset(dataset: &Dataset, name: impl Into<String>) -> Self {
        let (rows, cols) = dataset.shape();
        let total_missing = dataset.total_missing();
        let count = |pred: fn(DType) -> bool| {
            dataset.columns().iter().filter(|c| pred(c.dtype())).count()
        };

        Self {
            name: name.into(),
            shape: (rows, cols),
            memory_usage_mb: dataset.memory_usage_bytes() as f64 / 1024.0 / 1024.0,
            total_missing,
            missing_percentage: percentage(total_missing, rows * cols),
            duplicate_count: dataset.duplicate_row_count(),
            numeric_columns: count(|d| d.is_numeric()),
            categorical_columns: count(|d| d.is_string_like()),
            datetime_columns: count(|d| d == DType::DateTime),
            text_columns: count(|d| d == DType::Object),
        }
    }
}

/// Everything learned about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis {
    #[serde(flatten)]
    pub stats: ColumnStats,
    /// Absent only if the column's analysis aborted before inference finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_inference: Option<TypeInferenceResult>,
    pub recommendations: Vec<Recommendation>,
}

/// Results of the ID column checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdUniquenessReport {
    pub columns: IndexMap<String, IdCheck<IdUniqueness>>,
    /// Present when two or more ID columns are configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<IdCheck<CompositeIdUniqueness>>,
}

/// Complete output of a profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingResult {
    pub dataset_info: DatasetInfo,
    /// Per-column analyses in column order.
    pub columns: IndexMap<String, ColumnAnalysis>,
    pub general_recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<EnhancedAnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_uniqueness: Option<IdUniquenessReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_issues: Option<Vec<ColumnValidationIssue>>,
    /// Set when the data was loaded from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
}

impl ProfilingResult {
    /// Number of columns whose analysis failed.
    pub fn error_count(&self) -> usize {
        self.columns.values().filter(|c| c.stats.is_error()).count()
    }

    /// Total recommendations across columns and the dataset.
    pub fn recommendation_count(&self) -> usize {
        self.general_recommendations.len()
            + self
                .columns
                .values()
                .map(|c| c.recommendations.len())
                .sum::<usize>()
    }
}

/// The main profiling engine.
pub struct Profiler {
    config: ProfilerConfig,
    inference: TypeInferenceEngine,
    analyzer: StatisticalAnalyzer,
    enhanced: EnhancedAnalyzer,
    converter: TypeConverter,
    validator: DataValidator,
}

impl Profiler {
    /// Create a profiler with default configuration.
    pub fn new() -> Self {
        let config = ProfilerConfig::default();
        let thresholds = &config.thresholds;
        Self {
            inference: TypeInferenceEngine::new(),
            analyzer: StatisticalAnalyzer::with_thresholds(thresholds.clone()),
            enhanced: EnhancedAnalyzer::with_thresholds(thresholds.clone()),
            converter: TypeConverter::with_thresholds(thresholds),
            validator: DataValidator::default(),
            config,
        }
    }

    /// Create a profiler with custom configuration.
    ///
    /// Fails if any threshold is out of range.
    pub fn with_config(config: ProfilerConfig) -> Result<Self> {
        config.validate()?;
        let thresholds = &config.thresholds;
        Ok(Self {
            inference: TypeInferenceEngine::new(),
            analyzer: StatisticalAnalyzer::with_thresholds(thresholds.clone()),
            enhanced: EnhancedAnalyzer::with_thresholds(thresholds.clone()),
            converter: TypeConverter::with_thresholds(thresholds),
            validator: DataValidator::new(thresholds.validation)?,
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Load a delimited file and profile it.
    ///
    /// The dataset name defaults to the file stem.
    pub fn profile_path(
        &self,
        path: impl AsRef<Path>,
        name: Option<&str>,
    ) -> Result<ProfilingResult> {
        let parser = Parser::with_config(self.config.parser.clone());
        let (dataset, source) = parser.parse_file(path)?;
        let name = name.map(str::to_string).unwrap_or_else(|| source.stem());

        let mut result = self.profile_dataset(&dataset, Some(&name))?;
        result.source = Some(source);
        Ok(result)
    }

    /// Profile an in-memory dataset.
    ///
    /// Per-column failures are embedded in the result. The call itself only
    /// fails when strict validation finds messy numeric columns or when the
    /// converter cannot rebuild the dataset.
    pub fn profile_dataset(
        &self,
        dataset: &Dataset,
        name: Option<&str>,
    ) -> Result<ProfilingResult> {
        let name = name.unwrap_or(DEFAULT_DATASET_NAME);
        let (rows, cols) = dataset.shape();
        info!(dataset = name, rows, columns = cols, "profiling started");

        let validation_issues = if self.config.validate_input {
            let issues = self.validator.detect_issues(dataset);
            if self.config.strict_validation && !issues.is_empty() {
                return Err(AssayError::Validation { issues });
            }
            for issue in &issues {
                warn!(
                    column = %issue.column_name,
                    error_count = issue.error_count,
                    "messy numeric column"
                );
            }
            Some(issues)
        } else {
            None
        };

        let (working, conversion) = match self.config.conversion {
            ConversionMode::Off => (Cow::Borrowed(dataset), None),
            ConversionMode::Report => {
                let (_, outcome) = self.converter.find_and_convert_columns(dataset)?;
                (Cow::Borrowed(dataset), Some(outcome))
            }
            ConversionMode::Apply => {
                let (converted, outcome) = self.converter.find_and_convert_columns(dataset)?;
                (Cow::Owned(converted), Some(outcome))
            }
        };
        let working: &Dataset = &working;

        let columns: IndexMap<String, ColumnAnalysis> = working
            .columns()
            .iter()
            .map(|column| (column.name().to_string(), self.analyze_column_guarded(column)))
            .collect();

        let dataset_info = DatasetInfo::from_dataset(working, name);
        let general_recommendations =
            RecommendationEngine::general(&dataset_info, &self.config.thresholds);

        let targets = &self.config.target_columns;
        let enhanced = (!targets.is_empty()).then(|| self.enhanced.analyze(working, targets));

        let ids = &self.config.id_columns;
        let id_uniqueness = (!ids.is_empty()).then(|| IdUniquenessReport {
            columns: self.enhanced.check_id_uniqueness(working, ids),
            composite: (ids.len() > 1)
                .then(|| self.enhanced.check_composite_id_uniqueness(working, ids)),
        });

        let result = ProfilingResult {
            dataset_info,
            columns,
            general_recommendations,
            conversion,
            enhanced,
            id_uniqueness,
            validation_issues,
            source: None,
        };

        info!(
            dataset = name,
            errors = result.error_count(),
            recommendations = result.recommendation_count(),
            "profiling finished"
        );
        Ok(result)
    }

    /// Analyze one column, turning a panic into an error analysis.
    fn analyze_column_guarded(&self, column: &Column) -> ColumnAnalysis {
        match panic::catch_unwind(AssertUnwindSafe(|| self.analyze_column(column))) {
            Ok(analysis) => analysis,
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(column = column.name(), reason = %reason, "column analysis aborted");

                let error = ErrorStats::new(
                    AnalysisError::new(
                        ErrorCode::ColumnPanic,
                        format!("Analysis aborted: {reason}"),
                    ),
                    None,
                    column.len(),
                    column.null_count(),
                );
                ColumnAnalysis {
                    recommendations: vec![RecommendationEngine::analysis_error(&error)],
                    stats: ColumnStats::Error(error),
                    type_inference: None,
                }
            }
        }
    }

    fn analyze_column(&self, column: &Column) -> ColumnAnalysis {
        let type_inference = self.inference.infer(column);
        let kind = dispatch(column.dtype(), type_inference.suggested_type);
        debug!(
            column = column.name(),
            dtype = %column.dtype(),
            suggested = type_inference.suggested_type.as_str(),
            kind = ?kind,
            "analyzing column"
        );

        let as_error = |err: AnalysisError| {
            ColumnStats::Error(ErrorStats::new(
                err,
                Some(kind),
                column.len(),
                column.null_count(),
            ))
        };

        let stats = match kind {
            AnalysisKind::Numeric => self
                .analyzer
                .analyze_numeric(column)
                .map_or_else(as_error, ColumnStats::Numeric),
            AnalysisKind::Categorical => {
                ColumnStats::Categorical(self.analyzer.analyze_categorical(column))
            }
            AnalysisKind::Datetime => self
                .analyzer
                .analyze_datetime(column)
                .map_or_else(as_error, ColumnStats::Datetime),
            AnalysisKind::Other => ColumnStats::Other(self.analyzer.analyze_categorical(column)),
        };

        let recommendations = RecommendationEngine::for_column(&stats, &self.config.thresholds);

        ColumnAnalysis {
            stats,
            type_inference: Some(type_inference),
            recommendations,
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Choose the battery for a column.
///
/// Numeric wins over categorical, which wins over datetime, so a boolean
/// column is numeric and an object column with a datetime pattern is
/// categorical.
fn dispatch(dtype: DType, suggested: SemanticType) -> AnalysisKind {
    if suggested == SemanticType::Numeric || dtype.is_numeric_like() {
        AnalysisKind::Numeric
    } else if matches!(suggested, SemanticType::Categorical | SemanticType::Text)
        || dtype.is_string_like()
    {
        AnalysisKind::Categorical
    } else if suggested == SemanticType::Datetime || dtype == DType::DateTime {
        AnalysisKind::Datetime
    } else {
        AnalysisKind::Other
    }
}
