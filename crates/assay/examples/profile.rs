//! Example: Profile a tabular data file with Assay.
//!
//! Usage:
//!   cargo run --example profile -- <file_path> [target_column]
//!
//! Example:
//!   cargo run --example profile -- data/listings.csv price

use std::env;
use std::path::Path;

use assay::{ColumnStats, ConversionMode, Profiler, ProfilerConfig};

fn main() -> assay::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example profile -- <file_path> [target_column]");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example profile -- data/listings.csv price");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Assay Profile: {}", file_path);
    println!("{}", separator);
    println!();

    let mut config = ProfilerConfig::default().with_conversion(ConversionMode::Apply);
    if let Some(target) = args.get(2) {
        config = config.with_targets([target.clone()]);
    }
    let profiler = Profiler::with_config(config)?;
    let result = profiler.profile_path(path, None)?;

    // Print dataset info
    let info = &result.dataset_info;
    println!("## Dataset");
    println!("  Name: {}", info.name);
    println!("  Shape: {} rows x {} columns", info.shape.0, info.shape.1);
    println!("  Memory: {:.2} MB", info.memory_usage_mb);
    println!(
        "  Missing: {} ({:.1}%)",
        info.total_missing, info.missing_percentage
    );
    println!("  Duplicate rows: {}", info.duplicate_count);
    println!();

    // Print per-column summary
    println!("## Columns ({} total)", result.columns.len());
    println!();
    for (name, analysis) in &result.columns {
        let detail = match &analysis.stats {
            ColumnStats::Numeric(s) => format!(
                "mean={:.3} std={:.3} outliers(z)={}",
                s.mean, s.std, s.outliers.zscore_outliers
            ),
            ColumnStats::Categorical(s) | ColumnStats::Other(s) => format!(
                "unique={} mode={}",
                s.unique_count,
                s.mode.as_deref().unwrap_or("-")
            ),
            ColumnStats::Datetime(s) => format!("{} .. {}", s.min_date, s.max_date),
            ColumnStats::Error(s) => format!("error: {}", s.error),
        };
        println!(
            "  {:20} {:12} missing={:<6} {}",
            name,
            analysis.stats.type_name(),
            analysis.stats.missing_count(),
            detail
        );
        for rec in &analysis.recommendations {
            println!("                       - {}", rec);
        }
    }
    println!();

    // Print target analysis
    if let Some(enhanced) = &result.enhanced {
        for (target, corr) in &enhanced.target_correlations {
            println!("## Correlations with {}", target);
            for entry in corr.strong.iter().chain(&corr.moderate) {
                println!("  {:20} {:+.3}", entry.column, entry.correlation);
            }
            println!();
        }
    }

    // Print general recommendations
    println!(
        "## Recommendations ({} general)",
        result.general_recommendations.len()
    );
    for rec in &result.general_recommendations {
        println!("  - {}", rec);
    }
    println!();

    println!("{}", separator);

    Ok(())
}
