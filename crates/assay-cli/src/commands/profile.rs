//! Profile command - profile a data file and write the reports.

use std::fs;
use std::path::{Path, PathBuf};

use assay::{
    ColumnStats, ConversionMode, Dataset, Parser, ParserConfig, Profiler, ProfilerConfig,
    ProfilingResult, SourceMetadata,
};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

/// Seed for `--sample`, so repeated runs draw the same rows.
pub const SAMPLE_SEED: u64 = 42;

/// Options collected from the command line.
#[derive(Debug, Default)]
pub struct ProfileArgs {
    pub file: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub targets: Vec<String>,
    pub ids: Vec<String>,
    pub convert: Option<ConversionMode>,
    pub strict: bool,
    pub sample: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Paths of the two written reports.
#[derive(Debug)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub summary: PathBuf,
}

/// One row of `<stem>.column_summary.csv`.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    column: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    missing_count: usize,
    missing_percentage: String,
    mean: Option<String>,
    std: Option<String>,
    min: Option<String>,
    max: Option<String>,
    zscore_outliers: Option<usize>,
    unique_count: Option<usize>,
    mode: Option<&'a str>,
    recommendations: usize,
}

pub fn run(args: ProfileArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Validate input file exists
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    println!(
        "{} {}",
        "Profiling".cyan().bold(),
        args.file.display().to_string().white()
    );

    let config = build_config(&args)?;
    let profiler = Profiler::with_config(config)?;
    let (dataset, source) = load_dataset(&args.file, &profiler.config().parser, args.sample)?;
    let name = args.name.clone().unwrap_or_else(|| source.stem());

    let mut result = profiler.profile_dataset(&dataset, Some(&name))?;
    result.source = Some(source);

    if verbose {
        println!();
        println!("{}", "Columns:".yellow().bold());
        for (name, analysis) in &result.columns {
            let inferred = analysis
                .type_inference
                .as_ref()
                .map(|t| t.suggested_type.as_str())
                .unwrap_or("-");
            println!(
                "  {:20} {:12} {:14} missing={:.1}%",
                name,
                analysis.stats.type_name(),
                inferred,
                analysis.stats.missing_percentage()
            );
        }
        println!();
    }

    print_summary(&result);

    let dir = report_dir(&args.file, args.output_dir.as_deref());
    let paths = write_reports(&result, &dir, &file_stem(&args.file))?;

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        paths.json.display().to_string().white()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        paths.summary.display().to_string().white()
    );

    Ok(())
}

/// Load a data file, keeping at most `sample` rows.
///
/// Sampling is seeded with [`SAMPLE_SEED`]; the source metadata still
/// describes the whole file.
pub fn load_dataset(
    file: &Path,
    parser: &ParserConfig,
    sample: Option<usize>,
) -> Result<(Dataset, SourceMetadata), Box<dyn std::error::Error>> {
    let (dataset, source) = Parser::with_config(parser.clone()).parse_file(file)?;

    match sample {
        Some(n) if n < dataset.row_count() => {
            println!(
                "{} {} rows from {} total rows",
                "Sampling".cyan().bold(),
                n,
                dataset.row_count()
            );
            Ok((dataset.sample_rows(n, SAMPLE_SEED), source))
        }
        _ => Ok((dataset, source)),
    }
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &ProfileArgs) -> Result<ProfilerConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ProfilerConfig::load(path)?,
        None => ProfilerConfig::default(),
    };

    if !args.targets.is_empty() {
        config = config.with_targets(args.targets.iter().cloned());
    }
    if !args.ids.is_empty() {
        config = config.with_id_columns(args.ids.iter().cloned());
    }
    if let Some(mode) = args.convert {
        config = config.with_conversion(mode);
    }
    if args.strict {
        config = config.with_validation(true);
    }

    debug!(?config, "resolved profiler configuration");
    Ok(config)
}

fn print_summary(result: &ProfilingResult) {
    let info = &result.dataset_info;
    println!(
        "Profiled {} rows x {} columns ({} numeric, {} categorical, {} datetime)",
        info.shape.0.to_string().white().bold(),
        info.shape.1.to_string().white().bold(),
        info.numeric_columns,
        info.categorical_columns,
        info.datetime_columns
    );
    println!(
        "Missing values: {} ({:.1}%), duplicate rows: {}",
        info.total_missing, info.missing_percentage, info.duplicate_count
    );

    let errors = result.error_count();
    if errors > 0 {
        println!(
            "{} {} columns could not be analyzed",
            "Warning:".red().bold(),
            errors
        );
    }

    if let Some(issues) = &result.validation_issues {
        for issue in issues {
            println!(
                "{} {} looks numeric but has {} bad values (e.g. {})",
                "Warning:".yellow().bold(),
                issue.column_name,
                issue.error_count,
                issue.sample_errors.join(", ")
            );
        }
    }

    println!(
        "Generated {} recommendations",
        result.recommendation_count().to_string().white().bold()
    );
    for rec in &result.general_recommendations {
        println!("  {} {}", "-".blue(), rec);
    }
}

/// `output_dir`, or the data file's directory when unset.
pub fn report_dir(file: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

pub fn file_stem(file: &Path) -> String {
    file.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Write `<stem>.profile.json` and `<stem>.column_summary.csv` into `dir`.
pub fn write_reports(
    result: &ProfilingResult,
    dir: &Path,
    stem: &str,
) -> Result<ReportPaths, Box<dyn std::error::Error>> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }

    let json = dir.join(format!("{}.profile.json", stem));
    let summary = dir.join(format!("{}.column_summary.csv", stem));

    fs::write(&json, serde_json::to_string_pretty(result)?)?;

    let mut writer = csv::Writer::from_path(&summary)?;
    for (name, analysis) in &result.columns {
        writer.serialize(summary_row(name, &analysis.stats, analysis.recommendations.len()))?;
    }
    writer.flush()?;

    Ok(ReportPaths { json, summary })
}

fn summary_row<'a>(name: &'a str, stats: &'a ColumnStats, recommendations: usize) -> SummaryRow<'a> {
    let mut row = SummaryRow {
        column: name,
        kind: stats.type_name(),
        missing_count: stats.missing_count(),
        missing_percentage: fmt_float(stats.missing_percentage()),
        mean: None,
        std: None,
        min: None,
        max: None,
        zscore_outliers: None,
        unique_count: None,
        mode: None,
        recommendations,
    };

    match stats {
        ColumnStats::Numeric(s) => {
            row.mean = Some(fmt_float(s.mean));
            row.std = Some(fmt_float(s.std));
            row.min = Some(fmt_float(s.min));
            row.max = Some(fmt_float(s.max));
            row.zscore_outliers = Some(s.outliers.zscore_outliers);
        }
        ColumnStats::Categorical(s) | ColumnStats::Other(s) => {
            row.unique_count = Some(s.unique_count);
            row.mode = s.mode.as_deref();
        }
        ColumnStats::Datetime(_) | ColumnStats::Error(_) => {}
    }
    row
}

/// Four decimals, `NaN` for undefined values.
pub(crate) fn fmt_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_write_reports_next_to_file() {
        let dir = TempDir::new().unwrap();
        let data = create_test_file(dir.path(), "sales.csv", "region,amount\nN,10\nS,\nN,30\n");
        let result = Profiler::new().profile_path(&data, None).unwrap();

        let paths = write_reports(&result, &report_dir(&data, None), &file_stem(&data)).unwrap();
        assert_eq!(paths.json, dir.path().join("sales.profile.json"));
        assert_eq!(paths.summary, dir.path().join("sales.column_summary.csv"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["dataset_info"]["name"], "sales");
        assert_eq!(json["columns"]["amount"]["type"], "numeric");

        let mut reader = csv::Reader::from_path(&paths.summary).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "column");
        assert_eq!(&headers[1], "type");
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "region");
        assert_eq!(&rows[0][1], "categorical");
        assert_eq!(&rows[0][10], "N");
        assert_eq!(&rows[1][0], "amount");
        assert_eq!(&rows[1][2], "1");
        assert_eq!(&rows[1][4], "20.0000");
    }

    #[test]
    fn test_write_reports_to_output_dir() {
        let dir = TempDir::new().unwrap();
        let data = create_test_file(dir.path(), "a.tsv", "x\ty\n1\tp\n2\tq\n");
        let result = Profiler::new().profile_path(&data, None).unwrap();

        let out = dir.path().join("reports/nested");
        let paths =
            write_reports(&result, &report_dir(&data, Some(&out)), &file_stem(&data)).unwrap();
        assert!(paths.json.starts_with(&out));
        assert!(paths.json.exists());
        assert!(paths.summary.exists());
    }

    #[test]
    fn test_build_config_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"target_columns": ["a"], "conversion": "report"}"#)
            .unwrap();

        let args = ProfileArgs {
            config: Some(file.path().to_path_buf()),
            ids: vec!["id".to_string()],
            strict: true,
            ..ProfileArgs::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.target_columns, vec!["a"]);
        assert_eq!(config.id_columns, vec!["id"]);
        assert_eq!(config.conversion, ConversionMode::Report);
        assert!(config.strict_validation && config.validate_input);

        let args = ProfileArgs {
            config: Some(file.path().to_path_buf()),
            convert: Some(ConversionMode::Apply),
            ..ProfileArgs::default()
        };
        assert_eq!(build_config(&args).unwrap().conversion, ConversionMode::Apply);
    }

    #[test]
    fn test_missing_file_fails() {
        let args = ProfileArgs {
            file: PathBuf::from("/no/such/file.csv"),
            ..ProfileArgs::default()
        };
        assert!(run(args, false).is_err());
    }

    #[test]
    fn test_sample_limits_rows_deterministically() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("id,value\n");
        for i in 0..200 {
            content.push_str(&format!("{},{}\n", i, i % 17));
        }
        let data = create_test_file(dir.path(), "big.csv", &content);

        let (first, source) = load_dataset(&data, &ParserConfig::default(), Some(25)).unwrap();
        let (second, _) = load_dataset(&data, &ParserConfig::default(), Some(25)).unwrap();
        assert_eq!(first.row_count(), 25);
        assert_eq!(first, second);
        assert_eq!(source.row_count, 200);

        let (all, _) = load_dataset(&data, &ParserConfig::default(), Some(500)).unwrap();
        assert_eq!(all.row_count(), 200);
    }

    #[test]
    fn test_run_with_sample_reports_sampled_shape() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("id,score\n");
        for i in 0..120 {
            content.push_str(&format!("{},{}.5\n", i, i % 9));
        }
        let data = create_test_file(dir.path(), "scores.csv", &content);

        let args = ProfileArgs {
            file: data,
            sample: Some(30),
            ..ProfileArgs::default()
        };
        run(args, false).unwrap();

        let json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("scores.profile.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["dataset_info"]["shape"][0], 30);
        assert_eq!(json["dataset_info"]["name"], "scores");
        assert_eq!(json["source"]["row_count"], 120);
    }

    #[test]
    fn test_fmt_float() {
        assert_eq!(fmt_float(f64::NAN), "NaN");
        assert_eq!(fmt_float(1.5), "1.5000");
    }
}
