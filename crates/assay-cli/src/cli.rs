//! CLI argument definitions using clap.

use assay::ConversionMode;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Assay: automated exploratory profiling for tabular data
#[derive(Parser)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a data file and write JSON and CSV reports
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory for the reports (default: next to the data file)
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Dataset name used in the report (default: file stem)
        #[arg(long)]
        name: Option<String>,

        /// Target column for correlation and crosstab analysis (repeatable)
        #[arg(long = "target", value_name = "COL")]
        targets: Vec<String>,

        /// ID column to check for uniqueness (repeatable)
        #[arg(long = "id", value_name = "COL")]
        ids: Vec<String>,

        /// Type conversion mode (default: off, or the config file's setting)
        #[arg(long, value_enum)]
        convert: Option<ConvertChoice>,

        /// Fail when messy numeric columns are found
        #[arg(long)]
        strict: bool,

        /// Profile a seeded random sample of N rows
        #[arg(short = 's', long, value_name = "N")]
        sample: Option<usize>,

        /// JSON configuration file with thresholds and column settings
        #[arg(long, value_name = "JSON")]
        config: Option<PathBuf>,
    },

    /// Print a detailed analysis of selected columns
    Analyze {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column to analyze (repeatable, default: all columns)
        #[arg(short = 'c', long = "columns", value_name = "COL")]
        columns: Vec<String>,

        /// Directory for the reports (default: next to the data file)
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// JSON configuration file with thresholds and column settings
        #[arg(long, value_name = "JSON")]
        config: Option<PathBuf>,
    },
}

/// Conversion mode choice for profiling
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConvertChoice {
    /// Profile the data as loaded
    Off,
    /// Report convertible columns without changing them
    Report,
    /// Convert columns before profiling
    Apply,
}

impl From<ConvertChoice> for ConversionMode {
    fn from(choice: ConvertChoice) -> Self {
        match choice {
            ConvertChoice::Off => ConversionMode::Off,
            ConvertChoice::Report => ConversionMode::Report,
            ConvertChoice::Apply => ConversionMode::Apply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_profile_args() {
        let cli = Cli::try_parse_from([
            "assay", "profile", "data.csv", "-o", "out", "--target", "price", "--target",
            "sold", "--id", "sku", "--convert", "apply", "--strict", "-s", "500", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Profile {
            file,
            output_dir,
            targets,
            ids,
            convert,
            strict,
            sample,
            name,
            config,
        } = cli.command
        else {
            panic!("expected profile");
        };
        assert_eq!(file, PathBuf::from("data.csv"));
        assert_eq!(output_dir, Some(PathBuf::from("out")));
        assert_eq!(targets, vec!["price", "sold"]);
        assert_eq!(ids, vec!["sku"]);
        assert_eq!(convert, Some(ConvertChoice::Apply));
        assert!(strict);
        assert_eq!(sample, Some(500));
        assert!(name.is_none() && config.is_none());
    }

    #[test]
    fn test_convert_is_optional() {
        let cli = Cli::try_parse_from(["assay", "profile", "data.csv"]).unwrap();
        let Commands::Profile {
            convert, sample, ..
        } = cli.command
        else {
            panic!("expected profile");
        };
        assert_eq!(convert, None);
        assert_eq!(sample, None);
        assert_eq!(ConversionMode::from(ConvertChoice::Report), ConversionMode::Report);
    }

    #[test]
    fn test_rejects_unknown_convert_mode() {
        assert!(Cli::try_parse_from(["assay", "profile", "d.csv", "--convert", "maybe"]).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_sample() {
        assert!(Cli::try_parse_from(["assay", "profile", "d.csv", "--sample", "many"]).is_err());
    }

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "assay", "analyze", "data.csv", "-c", "price", "--columns", "region", "-o", "out",
        ])
        .unwrap();
        let Commands::Analyze {
            file,
            columns,
            output_dir,
            config,
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(file, PathBuf::from("data.csv"));
        assert_eq!(columns, vec!["price", "region"]);
        assert_eq!(output_dir, Some(PathBuf::from("out")));
        assert!(config.is_none());
    }
}
