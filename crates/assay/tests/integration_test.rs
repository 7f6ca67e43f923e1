//! Integration tests for Assay.

use std::io::Write;
use tempfile::NamedTempFile;

use assay::conversion::ConversionBucket;
use assay::enhanced::{IdCheck, TargetDistribution};
use assay::{
    AssayError, Column, ColumnStats, ConversionMode, Dataset, ErrorCode, Profiler, ProfilerConfig,
    Thresholds,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn customers_csv() -> String {
    let mut content = String::from("customer_id,age,segment,signup,spend,churned\n");
    let segments = ["retail", "retail", "retail", "business", "enterprise"];
    for i in 0..120 {
        let age = if i % 20 == 0 {
            "NA".to_string()
        } else {
            (20 + i % 45).to_string()
        };
        content.push_str(&format!(
            "C{:04},{},{},2023-{:02}-{:02},{:.2},{}\n",
            i,
            age,
            segments[i % segments.len()],
            i % 12 + 1,
            i % 28 + 1,
            50.0 + (i as f64) * 3.5,
            if i % 3 == 0 { "yes" } else { "no" },
        ));
    }
    content
}

// =============================================================================
// Basic Functionality Tests
// =============================================================================

#[test]
fn test_profile_basic_csv() {
    let file = create_test_file("id,name,age\n1,Alice,30\n2,Bob,25\n3,Carol,28\n");

    let result = Profiler::new()
        .profile_path(file.path(), Some("people"))
        .expect("Profiling failed");

    let source = result.source.as_ref().expect("source metadata");
    assert_eq!(source.row_count, 3);
    assert_eq!(source.column_count, 3);
    assert_eq!(source.format, "csv");
    assert!(source.hash.starts_with("sha256:"));

    assert_eq!(result.dataset_info.name, "people");
    assert_eq!(result.dataset_info.shape, (3, 3));
    assert_eq!(result.columns.len(), 3);
    assert_eq!(result.columns["name"].stats.type_name(), "categorical");
    assert_eq!(result.columns["age"].stats.type_name(), "numeric");
}

#[test]
fn test_profile_tsv_auto_detect_and_default_name() {
    let file = create_test_file("sample\tgroup\nS1\tA\nS2\tB\n");
    let result = Profiler::new().profile_path(file.path(), None).unwrap();

    let source = result.source.as_ref().unwrap();
    assert_eq!(source.format, "tsv");
    assert_eq!(result.dataset_info.name, source.stem());
}

#[test]
fn test_small_dataset_and_duplicates_recommended() {
    let file = create_test_file("a,b\n1,x\n1,x\n2,y\n");
    let result = Profiler::new().profile_path(file.path(), None).unwrap();

    let messages: Vec<&str> = result
        .general_recommendations
        .iter()
        .map(|r| r.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Small dataset. Consider collecting more data for robust analysis.",
            "Found 1 duplicate rows. Consider removing duplicates.",
        ]
    );
}

#[test]
fn test_repeated_header_is_renamed_not_rejected() {
    let file = create_test_file("a,a,b\n1,2,x\n3,4,y\n");
    let result = Profiler::new().profile_path(file.path(), None).unwrap();

    assert_eq!(
        result.columns.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["a", "a.1", "b"]
    );
    let ColumnStats::Numeric(second) = &result.columns["a.1"].stats else {
        panic!("a.1 should be numeric");
    };
    assert_eq!(second.mean, 3.0);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Profiler::new()
        .profile_path("/definitely/not/here.csv", None)
        .unwrap_err();
    assert!(matches!(err, AssayError::Io { .. }));
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

#[test]
fn test_age_scenario_end_to_end() {
    let file = create_test_file("age\n25\n30\n\n40\n200\n");
    let result = Profiler::new().profile_path(file.path(), None).unwrap();

    let ColumnStats::Numeric(age) = &result.columns["age"].stats else {
        panic!("age should be numeric");
    };
    assert_eq!(age.count, 4);
    assert_eq!(age.missing_count, 1);
    assert_eq!(age.missing_percentage, 20.0);
    assert!((age.mean - 73.75).abs() < 1e-9);
    assert_eq!(age.outliers.zscore_outliers, 0);
}

#[test]
fn test_customers_with_targets_ids_and_conversion() {
    let file = create_test_file(&customers_csv());
    let config = ProfilerConfig::default()
        .with_targets(["spend", "churned"])
        .with_id_columns(["customer_id", "segment"])
        .with_conversion(ConversionMode::Apply);
    let result = Profiler::with_config(config)
        .unwrap()
        .profile_path(file.path(), None)
        .unwrap();

    // Dates become datetimes only after conversion.
    assert_eq!(result.columns["signup"].stats.type_name(), "datetime");
    let conversion = result.conversion.as_ref().unwrap();
    assert_eq!(
        conversion.datetime.bucket_of("signup"),
        Some(ConversionBucket::Convertible)
    );
    assert_eq!(
        conversion.float.bucket_of("spend"),
        Some(ConversionBucket::AlreadyTyped)
    );

    let enhanced = result.enhanced.as_ref().unwrap();
    let spend = &enhanced.target_correlations["spend"];
    assert!(spend.correlations.contains_key("age"));
    assert!(!enhanced.target_correlations.contains_key("churned"));
    assert!(matches!(
        enhanced.target_distributions["churned"],
        TargetDistribution::Categorical(_)
    ));
    let by_churn = &enhanced.categorical_by_target["churned"];
    assert!(by_churn.contains_key("segment"));
    assert!(by_churn.contains_key("customer_id"));

    let ids = result.id_uniqueness.as_ref().unwrap();
    let customer = ids.columns["customer_id"].checked().unwrap();
    assert!(customer.is_unique);
    let segment = ids.columns["segment"].checked().unwrap();
    assert_eq!(segment.unique_count, 3);
    let composite = ids.composite.as_ref().unwrap().checked().unwrap();
    assert!(composite.uniqueness.is_unique);
}

#[test]
fn test_conversion_report_mode_keeps_original_types() {
    let file = create_test_file("when,amount\n2024-01-01,1\n2024-01-02,2\n");
    let config = ProfilerConfig::default().with_conversion(ConversionMode::Report);
    let result = Profiler::with_config(config)
        .unwrap()
        .profile_path(file.path(), None)
        .unwrap();

    assert_eq!(result.columns["when"].stats.type_name(), "categorical");
    let conversion = result.conversion.unwrap();
    assert_eq!(conversion.datetime.convertible_columns, vec!["when".to_string()]);
    assert_eq!(conversion.float_analysis.total_columns, 2);
}

#[test]
fn test_strict_validation_from_file() {
    let mut content = String::from("reading\n");
    for i in 0..40 {
        content.push_str(&format!("{i}.5\n"));
    }
    content.push_str("n/d\n");
    let file = create_test_file(&content);

    let config = ProfilerConfig::default().with_validation(true);
    let err = Profiler::with_config(config)
        .unwrap()
        .profile_path(file.path(), None)
        .unwrap_err();
    let AssayError::Validation { issues } = err else {
        panic!("expected validation failure");
    };
    assert_eq!(issues[0].column_name, "reading");
    assert_eq!(issues[0].sample_errors, vec!["n/d".to_string()]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_profile_is_idempotent() {
    let file = create_test_file(&customers_csv());
    let profiler = Profiler::with_config(
        ProfilerConfig::default()
            .with_targets(["spend"])
            .with_id_columns(["customer_id"]),
    )
    .unwrap();
    let parser = assay::Parser::new();
    let (dataset, _) = parser.parse_file(file.path()).unwrap();

    let first = profiler.profile_dataset(&dataset, Some("c")).unwrap();
    let second = profiler.profile_dataset(&dataset, Some("c")).unwrap();
    // NaN fields compare unequal, so compare the serialized form.
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_zscore_threshold_is_monotone() {
    let values: Vec<Option<f64>> = (0..50)
        .map(|i| Some(if i % 10 == 0 { 100.0 + i as f64 } else { i as f64 % 7.0 }))
        .collect();
    let dataset = Dataset::new(vec![Column::from_floats("x", values)]).unwrap();

    let mut previous = usize::MAX;
    for z in [0.5, 1.0, 2.0, 3.0, 4.0] {
        let config = ProfilerConfig::default().with_thresholds(Thresholds {
            zscore: z,
            ..Thresholds::default()
        });
        let result = Profiler::with_config(config)
            .unwrap()
            .profile_dataset(&dataset, None)
            .unwrap();
        let ColumnStats::Numeric(stats) = &result.columns["x"].stats else {
            panic!("expected numeric");
        };
        assert!(stats.outliers.zscore_outliers <= previous);
        previous = stats.outliers.zscore_outliers;
    }
}

#[test]
fn test_rare_category_is_strict() {
    // 1 of 100 is exactly 1% and not rare; 1 of 101 is.
    let mut values: Vec<Option<String>> = vec![Some("common".to_string()); 99];
    values.push(Some("edge".to_string()));
    let dataset = Dataset::new(vec![Column::from_strs("c", values.clone())]).unwrap();
    let result = Profiler::new().profile_dataset(&dataset, None).unwrap();
    let ColumnStats::Categorical(stats) = &result.columns["c"].stats else {
        panic!("expected categorical");
    };
    assert!(stats.rare_categories.is_empty());

    values.push(Some("common".to_string()));
    let dataset = Dataset::new(vec![Column::from_strs("c", values)]).unwrap();
    let result = Profiler::new().profile_dataset(&dataset, None).unwrap();
    let ColumnStats::Categorical(stats) = &result.columns["c"].stats else {
        panic!("expected categorical");
    };
    assert_eq!(stats.rare_categories, vec!["edge".to_string()]);
}

#[test]
fn test_missing_id_column_does_not_fail_run() {
    let dataset = Dataset::new(vec![Column::from_ints("id", vec![Some(1), Some(2)])]).unwrap();
    let config = ProfilerConfig::default().with_id_columns(["id", "ghost"]);
    let result = Profiler::with_config(config)
        .unwrap()
        .profile_dataset(&dataset, None)
        .unwrap();

    let ids = result.id_uniqueness.unwrap();
    assert!(ids.columns["id"].checked().unwrap().is_unique);
    let IdCheck::Error(err) = &ids.columns["ghost"] else {
        panic!("expected error entry");
    };
    assert_eq!(err.code, ErrorCode::ColumnNotFound);
    let Some(IdCheck::Error(err)) = &ids.composite else {
        panic!("expected composite error");
    };
    assert_eq!(err.code, ErrorCode::ColumnNotFound);
}

#[test]
fn test_json_round_trip_of_full_result() {
    let file = create_test_file(&customers_csv());
    let config = ProfilerConfig::default()
        .with_targets(["churned"])
        .with_conversion(ConversionMode::Report);
    let result = Profiler::with_config(config)
        .unwrap()
        .profile_path(file.path(), None)
        .unwrap();

    let json = serde_json::to_string_pretty(&result).unwrap();
    let back: assay::ProfilingResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.columns.len(), result.columns.len());
    assert_eq!(back.dataset_info, result.dataset_info);
    assert_eq!(
        back.columns["age"].stats.missing_count(),
        result.columns["age"].stats.missing_count()
    );
    assert_eq!(
        result.columns.get_index_of("customer_id"),
        Some(0),
        "columns keep file order"
    );
    assert_eq!(
        back.columns.keys().collect::<Vec<_>>(),
        result.columns.keys().collect::<Vec<_>>()
    );
}
