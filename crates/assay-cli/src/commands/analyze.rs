//! Analyze command - detailed report for a subset of columns.

use std::path::PathBuf;

use assay::{ColumnStats, Profiler, ProfilerConfig, ProfilingResult};
use colored::Colorize;

use super::profile::{file_stem, fmt_float, load_dataset, report_dir, write_reports};

/// Options collected from the command line.
#[derive(Debug, Default)]
pub struct AnalyzeArgs {
    pub file: PathBuf,
    /// Columns to keep; empty means all of them.
    pub columns: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    let config = match &args.config {
        Some(path) => ProfilerConfig::load(path)?,
        None => ProfilerConfig::default(),
    };
    let profiler = Profiler::with_config(config)?;
    let result = analyze_file(&profiler, &args)?;

    for (name, analysis) in &result.columns {
        println!();
        println!("{}", "=".repeat(60));
        println!("{} {}", "COLUMN:".cyan().bold(), name.white().bold());
        println!("{}", "=".repeat(60));
        print_column(&analysis.stats);

        if !analysis.recommendations.is_empty() {
            println!();
            println!("{}", "Recommendations:".yellow().bold());
            for (i, rec) in analysis.recommendations.iter().enumerate() {
                println!("  {}. {}", i + 1, rec);
            }
        }
    }

    let stem = format!("{}_analysis", file_stem(&args.file));
    let dir = report_dir(&args.file, args.output_dir.as_deref());
    let paths = write_reports(&result, &dir, &stem)?;

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

/// Load the file, keep the requested columns and profile them.
///
/// Unknown column names fail with `AssayError::ColumnNotFound` before any
/// analysis runs.
fn analyze_file(
    profiler: &Profiler,
    args: &AnalyzeArgs,
) -> Result<ProfilingResult, Box<dyn std::error::Error>> {
    let (dataset, source) = load_dataset(&args.file, &profiler.config().parser, None)?;
    let dataset = if args.columns.is_empty() {
        dataset
    } else {
        let selected = dataset.select(&args.columns)?;
        println!(
            "{} {}",
            "Analyzing columns:".cyan().bold(),
            selected.column_names().join(", ")
        );
        selected
    };

    let name = format!("{}_analysis", source.stem());
    let mut result = profiler.profile_dataset(&dataset, Some(&name))?;
    result.source = Some(source);
    Ok(result)
}

fn print_column(stats: &ColumnStats) {
    println!("Type: {}", stats.type_name());
    println!(
        "Missing: {} ({:.1}%)",
        stats.missing_count(),
        stats.missing_percentage()
    );

    match stats {
        ColumnStats::Numeric(s) => {
            println!("Mean: {}", fmt_float(s.mean));
            println!("Std: {}", fmt_float(s.std));
            println!("Min: {}", fmt_float(s.min));
            println!("Max: {}", fmt_float(s.max));
            println!("Outliers: {}", s.outliers.zscore_outliers);
        }
        ColumnStats::Categorical(s) => {
            println!("Unique Values: {}", s.unique_count);
            println!("Most Common: {}", s.mode.as_deref().unwrap_or("-"));
        }
        ColumnStats::Datetime(s) => {
            println!("Range: {} to {}", s.min_date, s.max_date);
        }
        ColumnStats::Other(_) => {}
        ColumnStats::Error(e) => {
            println!("{} {}", "Error:".red().bold(), e.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay::AssayError;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const ORDERS: &str = "order_id,region,amount,note\n1,N,10.5,a\n2,S,,b\n3,N,30.25,c\n4,E,12,d\n";

    #[test]
    fn test_analyze_selected_columns_only() {
        let dir = TempDir::new().unwrap();
        let data = create_test_file(dir.path(), "orders.csv", ORDERS);
        let args = AnalyzeArgs {
            file: data,
            columns: vec!["amount".to_string(), "region".to_string()],
            ..AnalyzeArgs::default()
        };

        let result = analyze_file(&Profiler::new(), &args).unwrap();
        assert_eq!(
            result.columns.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["amount", "region"]
        );
        assert_eq!(result.dataset_info.name, "orders_analysis");
        assert_eq!(result.dataset_info.shape, (4, 2));
        assert_eq!(result.columns["amount"].stats.missing_count(), 1);
    }

    #[test]
    fn test_analyze_without_columns_keeps_all() {
        let dir = TempDir::new().unwrap();
        let data = create_test_file(dir.path(), "orders.csv", ORDERS);
        let args = AnalyzeArgs {
            file: data,
            ..AnalyzeArgs::default()
        };
        let result = analyze_file(&Profiler::new(), &args).unwrap();
        assert_eq!(result.columns.len(), 4);
    }

    #[test]
    fn test_analyze_rejects_unknown_columns() {
        let dir = TempDir::new().unwrap();
        let data = create_test_file(dir.path(), "orders.csv", ORDERS);
        let args = AnalyzeArgs {
            file: data,
            columns: vec!["amount".to_string(), "discount".to_string()],
            ..AnalyzeArgs::default()
        };

        let err = analyze_file(&Profiler::new(), &args).unwrap_err();
        match err.downcast_ref::<AssayError>() {
            Some(AssayError::ColumnNotFound { columns }) => {
                assert_eq!(columns, &vec!["discount".to_string()]);
            }
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_writes_suffixed_reports() {
        let dir = TempDir::new().unwrap();
        let data = create_test_file(dir.path(), "orders.csv", ORDERS);
        let out = dir.path().join("out");
        let args = AnalyzeArgs {
            file: data,
            columns: vec!["region".to_string()],
            output_dir: Some(out.clone()),
            ..AnalyzeArgs::default()
        };
        run(args).unwrap();

        assert!(out.join("orders_analysis.profile.json").exists());
        let mut reader = csv::Reader::from_path(out.join("orders_analysis.column_summary.csv")).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "region");
    }

    #[test]
    fn test_missing_file_fails() {
        let args = AnalyzeArgs {
            file: PathBuf::from("/no/such/file.csv"),
            ..AnalyzeArgs::default()
        };
        assert!(run(args).is_err());
    }
}
