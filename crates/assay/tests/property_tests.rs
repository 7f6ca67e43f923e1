//! Property-based tests for the Assay profiler.
//!
//! These tests use proptest to generate random tables and verify that the
//! parser, converter and profiler keep their invariants under all inputs.
//!
//! # Testing Philosophy
//!
//! Property-based tests verify:
//! 1. **No panics**: Parsing and profiling never crash on any input
//! 2. **Determinism**: Same input always produces same output
//! 3. **Consistency**: Every column lands in exactly one conversion bucket
//! 4. **Invariants**: Percentages stay in range and thresholds are monotone
//!
//! # Running Property Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p assay --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p assay --test property_tests
//! ```

use proptest::prelude::*;

use assay::conversion::ConversionReport;
use assay::{
    Column, ColumnStats, ConversionMode, Dataset, Parser, Profiler, ProfilerConfig, Thresholds,
    TypeConverter, TypeInferenceEngine,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Generate a single cell as it might appear in a messy export.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        // Integers
        (-1000i64..1000).prop_map(|n| n.to_string()),
        // Floats
        (-1e4f64..1e4).prop_map(|x| format!("{x:.3}")),
        // ISO dates
        (2000u32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{y}-{m:02}-{d:02}")),
        // Words
        "[a-z]{1,8}",
        // Emails
        "[a-z]{3,8}@[a-z]{3,8}\\.com",
        // Null tokens
        prop_oneof![Just(String::new()), Just("NA".to_string()), Just("null".to_string())],
    ]
}

/// Generate a rectangular CSV document with 1-5 columns and 0-40 rows.
fn csv_document() -> impl Strategy<Value = String> {
    (1usize..6, 0usize..40).prop_flat_map(|(cols, rows)| {
        prop::collection::vec(prop::collection::vec(cell(), cols), rows).prop_map(move |rows| {
            let header: Vec<String> = (0..cols).map(|i| format!("col{i}")).collect();
            let mut doc = header.join(",");
            doc.push('\n');
            for row in rows {
                doc.push_str(&row.join(","));
                doc.push('\n');
            }
            doc
        })
    })
}

/// Generate completely random bytes (edge cases)
fn random_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..300)
}

/// Generate a numeric column with optional nulls.
fn float_values() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.9, -1e6f64..1e6), 1..80)
}

fn parse(doc: &str) -> Option<Dataset> {
    Parser::new().parse_slice(doc.as_bytes()).ok()
}

fn assert_partition(report: &ConversionReport, dataset: &Dataset) -> Result<(), TestCaseError> {
    prop_assert_eq!(report.total_columns(), dataset.column_count());
    for name in dataset.column_names() {
        prop_assert!(report.bucket_of(name).is_some(), "{} has no bucket", name);
    }
    Ok(())
}

// =============================================================================
// Parser Properties
// =============================================================================

mod parser_tests {
    use super::*;

    proptest! {
        /// Parser never panics on arbitrary bytes.
        #[test]
        fn never_panics_on_random_bytes(input in random_bytes()) {
            let _ = Parser::new().parse_slice(&input);
        }

        /// Parsing keeps the row count of a rectangular document.
        #[test]
        fn shape_matches_document(doc in csv_document()) {
            // Blank lines are skipped by the reader.
            let expected_rows = doc.lines().skip(1).filter(|l| !l.is_empty()).count();
            if let Some(dataset) = parse(&doc) {
                prop_assert_eq!(dataset.row_count(), expected_rows);
            }
        }
    }
}

// =============================================================================
// Profiler Properties
// =============================================================================

mod profiler_tests {
    use super::*;

    proptest! {
        /// Profiling any parsed table never panics and covers every column.
        #[test]
        fn covers_every_column(doc in csv_document()) {
            if let Some(dataset) = parse(&doc) {
                let result = Profiler::new().profile_dataset(&dataset, None).unwrap();
                prop_assert_eq!(result.columns.len(), dataset.column_count());
                for (name, analysis) in &result.columns {
                    prop_assert!(dataset.column(name).is_some());
                    let missing = analysis.stats.missing_percentage();
                    prop_assert!(missing.is_nan() || (0.0..=100.0).contains(&missing));
                }
            }
        }

        /// Profiling is deterministic.
        #[test]
        fn profiling_is_deterministic(doc in csv_document()) {
            if let Some(dataset) = parse(&doc) {
                let profiler = Profiler::with_config(
                    ProfilerConfig::default().with_conversion(ConversionMode::Apply),
                )
                .unwrap();
                let first = profiler.profile_dataset(&dataset, Some("p")).unwrap();
                let second = profiler.profile_dataset(&dataset, Some("p")).unwrap();
                prop_assert_eq!(
                    serde_json::to_string(&first).unwrap(),
                    serde_json::to_string(&second).unwrap()
                );
            }
        }

        /// Raising the z-score threshold never adds outliers.
        #[test]
        fn zscore_threshold_is_monotone(values in float_values(), low in 0.5f64..3.0, bump in 0.0f64..3.0) {
            let dataset = Dataset::new(vec![Column::from_floats("x", values)]).unwrap();
            let count = |z: f64| -> Option<usize> {
                let config = ProfilerConfig::default().with_thresholds(Thresholds {
                    zscore: z,
                    ..Thresholds::default()
                });
                let result = Profiler::with_config(config).ok()?.profile_dataset(&dataset, None).ok()?;
                match &result.columns["x"].stats {
                    ColumnStats::Numeric(stats) => Some(stats.outliers.zscore_outliers),
                    _ => None,
                }
            };
            if let (Some(loose), Some(strict)) = (count(low), count(low + bump)) {
                prop_assert!(strict <= loose);
            }
        }

        /// Rare categories are strictly below the configured share.
        #[test]
        fn rare_categories_below_threshold(words in prop::collection::vec("[a-e]{1,2}", 1..200)) {
            let dataset = Dataset::new(vec![Column::from_strs("w", words.iter().map(|w| Some(w.as_str())))]).unwrap();
            let result = Profiler::new().profile_dataset(&dataset, None).unwrap();
            if let ColumnStats::Categorical(stats) = &result.columns["w"].stats {
                for rare in &stats.rare_categories {
                    let hits = words.iter().filter(|w| *w == rare).count();
                    prop_assert!((hits as f64 / words.len() as f64) < 0.01);
                }
            }
        }
    }
}

// =============================================================================
// Conversion Properties
// =============================================================================

mod conversion_tests {
    use super::*;

    proptest! {
        /// Every column lands in exactly one bucket of each report.
        #[test]
        fn buckets_partition_columns(doc in csv_document()) {
            if let Some(dataset) = parse(&doc) {
                let (converted, outcome) = TypeConverter::default()
                    .find_and_convert_columns(&dataset)
                    .unwrap();
                assert_partition(&outcome.float, &dataset)?;
                assert_partition(&outcome.datetime, &dataset)?;
                prop_assert_eq!(converted.column_names(), dataset.column_names());
                prop_assert_eq!(converted.row_count(), dataset.row_count());
            }
        }

        /// Pattern confidence is a fraction.
        #[test]
        fn pattern_confidence_in_range(doc in csv_document()) {
            if let Some(dataset) = parse(&doc) {
                let engine = TypeInferenceEngine::new();
                for column in dataset.columns() {
                    let inferred = engine.infer(column);
                    prop_assert!((0.0..=1.0).contains(&inferred.pattern_confidence));
                }
            }
        }
    }
}
