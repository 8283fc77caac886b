//! Sanitizer Report CLI
//!
//! Summarizes sanitizer errors and warnings found in package test logs
//! into CSV and xUnit XML reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use sanitizer_reports::commands::{execute_report, validate_args, ReportArgs};
use sanitizer_reports::utils::config::{
    ParserConfig, DEFAULT_CSV_REPORT, DEFAULT_PROJECT_MARKER, DEFAULT_XML_REPORT, SCHEMA_VERSION,
};

/// Sanitizer Report - deduplicated sanitizer findings from test logs
#[derive(Parser, Debug)]
#[command(name = "sanitizer-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse test logs and write sanitizer reports
    Report {
        /// Log directory with one <package>/stdout_stderr.log per package
        #[arg(short = 'b', long)]
        log_base: Option<PathBuf>,

        /// Individual log file (repeatable)
        #[arg(short, long = "log")]
        logs: Vec<PathBuf>,

        /// Package name for a single --log (defaults to its parent directory name)
        #[arg(short, long)]
        package: Option<String>,

        /// Output path for the CSV report
        #[arg(long, default_value = DEFAULT_CSV_REPORT)]
        csv: PathBuf,

        /// Output path for the XML report
        #[arg(long, default_value = DEFAULT_XML_REPORT)]
        xml: PathBuf,

        /// Output path for a JSON summary (optional)
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Path component marking frames from the project's own sources
        #[arg(long, env = "SANITIZER_REPORT_MARKER", default_value = DEFAULT_PROJECT_MARKER)]
        marker: String,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of keys in the text summary
        #[arg(long, default_value = "20")]
        top_keys: usize,
    },

    /// Validate a JSON summary file
    Validate {
        /// Path to summary JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            log_base,
            logs,
            package,
            csv,
            xml,
            summary_json,
            marker,
            summary,
            top_keys,
        } => {
            let args = ReportArgs {
                log_base,
                logs,
                package,
                output_csv: csv,
                output_xml: xml,
                output_summary: summary_json,
                parser_config: ParserConfig::new().with_project_marker(marker),
                print_summary: summary,
                top_keys,
            };

            // Validate args first
            validate_args(&args)?;

            execute_report(args)?;
        }

        Commands::Validate { file } => {
            validate_summary_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a JSON summary file
///
/// **Private** - internal command implementation
fn validate_summary_file(file_path: PathBuf) -> Result<()> {
    use sanitizer_reports::output::read_summary;

    println!("Validating summary: {}", file_path.display());

    let summary = read_summary(&file_path)?;

    println!("✓ Valid summary JSON");
    println!("  Version: {}", summary.version);
    println!("  Generated: {}", summary.generated_at);
    println!("  Packages: {}", summary.packages.len());
    println!("  Distinct Keys: {}", summary.distinct_keys);
    println!("  Occurrences: {}", summary.total_occurrences);

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Sanitizer Report v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Deduplicated sanitizer findings from test logs.");
}
