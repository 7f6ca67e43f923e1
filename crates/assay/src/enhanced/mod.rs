//! Target-aware and key-aware analysis.
//!
//! [`EnhancedAnalyzer`] answers questions about a dataset relative to chosen
//! columns: how other columns correlate with a target, how a target is
//! distributed, whether categorical features depend on it, and whether ID
//! columns really identify rows. Missing or unsuitable columns are logged
//! and skipped, or reported as embedded errors; nothing here fails a run.

mod correlation;
mod crosstab;
mod target;
mod uniqueness;

pub use correlation::{CorrelationEntry, TargetCorrelation};
pub use crosstab::CrosstabResult;
pub use target::{CategoricalTarget, ClassBalance, TargetDistribution};
pub use uniqueness::{CompositeIdUniqueness, IdCheck, IdUniqueness};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::StatisticalAnalyzer;
use crate::config::Thresholds;
use crate::input::{Column, Dataset};

/// Per-target results of the enhanced analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancedAnalysisResult {
    /// Numeric targets only.
    pub target_correlations: IndexMap<String, TargetCorrelation>,
    pub target_distributions: IndexMap<String, TargetDistribution>,
    /// Target name, then feature name.
    pub categorical_by_target: IndexMap<String, IndexMap<String, CrosstabResult>>,
}

/// Runs correlation, distribution, crosstab and uniqueness checks.
#[derive(Debug, Clone, Default)]
pub struct EnhancedAnalyzer {
    analyzer: StatisticalAnalyzer,
}

impl EnhancedAnalyzer {
    /// Create an analyzer with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with the given thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            analyzer: StatisticalAnalyzer::with_thresholds(thresholds),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.analyzer.thresholds()
    }

    /// Run every target analysis for each target in order.
    pub fn analyze(&self, dataset: &Dataset, targets: &[String]) -> EnhancedAnalysisResult {
        let categorical_by_target = targets
            .iter()
            .filter(|t| dataset.column(t).is_some())
            .map(|t| (t.clone(), self.analyze_categorical_by_target(dataset, t, None)))
            .collect();

        EnhancedAnalysisResult {
            target_correlations: self.analyze_target_correlation(dataset, targets),
            target_distributions: self.analyze_target_distribution(dataset, targets),
            categorical_by_target,
        }
    }
}

/// Numeric value of row `row`, if present.
fn numeric_at(column: &Column, row: usize) -> Option<f64> {
    column.get(row).and_then(|v| v.as_f64())
}
