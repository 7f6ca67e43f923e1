//! Assay CLI - automated exploratory profiling for tabular data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Profile {
            file,
            output_dir,
            name,
            targets,
            ids,
            convert,
            strict,
            sample,
            config,
        } => commands::profile::run(
            commands::profile::ProfileArgs {
                file,
                output_dir,
                name,
                targets,
                ids,
                convert: convert.map(Into::into),
                strict,
                sample,
                config,
            },
            cli.verbose,
        ),
        Commands::Analyze {
            file,
            columns,
            output_dir,
            config,
        } => commands::analyze::run(commands::analyze::AnalyzeArgs {
            file,
            columns,
            output_dir,
            config,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, honoring `RUST_LOG` and falling back to warn (debug with -v).
fn init_logging(verbose: bool) {
    let default = if verbose { "assay=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
