//! Report command implementation.
//!
//! The report command:
//! 1. Locates the test log of every package
//! 2. Feeds each log to the sanitizer log parser
//! 3. Writes the CSV and XML reports
//! 4. Optionally writes a JSON summary and prints a text summary

use crate::aggregator::{generate_text_summary, summarize};
use crate::output::{write_csv, write_summary, write_xml};
use crate::parser::SanitizerLogParser;
use crate::utils::config::{
    ParserConfig, DEFAULT_CSV_REPORT, DEFAULT_XML_REPORT, PACKAGE_LOG_FILE_NAME,
};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Directory holding one `<package>/stdout_stderr.log` per package
    pub log_base: Option<PathBuf>,

    /// Individual log files
    pub logs: Vec<PathBuf>,

    /// Package name for a single entry of `logs`
    pub package: Option<String>,

    /// Output path for the CSV report
    pub output_csv: PathBuf,

    /// Output path for the XML report
    pub output_xml: PathBuf,

    /// Output path for the JSON summary (optional)
    pub output_summary: Option<PathBuf>,

    /// Parser configuration
    pub parser_config: ParserConfig,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Number of keys in the text summary
    pub top_keys: usize,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            log_base: None,
            logs: Vec::new(),
            package: None,
            output_csv: PathBuf::from(DEFAULT_CSV_REPORT),
            output_xml: PathBuf::from(DEFAULT_XML_REPORT),
            output_summary: None,
            parser_config: ParserConfig::default(),
            print_summary: false,
            top_keys: 20,
        }
    }
}

/// A package test log to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLog {
    pub package: String,
    pub path: PathBuf,
}

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// No report is written if any log contains a section that cannot be parsed.
pub fn execute_report(args: ReportArgs) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Locate logs
    info!("Step 1/3: Locating package logs...");
    let package_logs = collect_package_logs(&args)?;
    info!("Found {} package log(s)", package_logs.len());

    // Step 2: Parse logs
    info!("Step 2/3: Parsing sanitizer output...");
    let mut parser = SanitizerLogParser::new(&args.parser_config)
        .context("Failed to create sanitizer log parser")?;

    for package_log in &package_logs {
        parser.set_package(package_log.package.as_str());
        let parsed = parse_log_file(&mut parser, &package_log.path)?;
        if !parsed {
            info!("Could not open {}", package_log.path.display());
        }
        parser.finish();
    }

    let summary = summarize(parser.aggregator());
    info!("Report: {}", summary.summary());

    // Step 3: Write outputs
    info!("Step 3/3: Writing reports...");
    write_csv(parser.aggregator(), &args.output_csv).context("Failed to write CSV report")?;
    info!("✓ CSV report written to: {}", args.output_csv.display());

    write_xml(parser.aggregator(), &args.output_xml).context("Failed to write XML report")?;
    info!("✓ XML report written to: {}", args.output_xml.display());

    if let Some(summary_path) = &args.output_summary {
        write_summary(&summary, summary_path).context("Failed to write JSON summary")?;
        info!("✓ Summary written to: {}", summary_path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("SANITIZER REPORT SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Packages:      {}", summary.packages.len());
        println!("Distinct Keys: {}", summary.distinct_keys);
        println!("Occurrences:   {}", summary.total_occurrences);
        for (error_name, count) in &summary.by_error_name {
            println!("  {:<40} {:>7}", error_name, count);
        }
        println!("\n{}", generate_text_summary(parser.aggregator(), args.top_keys));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Report completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Feed every line of a log file to the parser
///
/// Returns `Ok(false)` if the file cannot be opened; the package then simply
/// contributes nothing.
///
/// # Errors
/// * Read errors after the file was opened
/// * Fatal parse errors
pub fn parse_log_file(parser: &mut SanitizerLogParser, path: &Path) -> Result<bool> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("Cannot open {}: {}", path.display(), e);
            return Ok(false);
        }
    };

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    let mut line_number = 0usize;

    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(&buffer);
        parser.parse_line(&line).with_context(|| {
            format!("Failed to parse {} at line {}", path.display(), line_number)
        })?;
    }

    debug!("Parsed {} lines from {}", line_number, path.display());
    Ok(true)
}

/// All logs named by the arguments, log base packages first
pub fn collect_package_logs(args: &ReportArgs) -> Result<Vec<PackageLog>> {
    let mut package_logs = Vec::new();

    if let Some(log_base) = &args.log_base {
        package_logs.extend(discover_package_logs(log_base)?);
    }

    for path in &args.logs {
        let package = match &args.package {
            Some(package) => package.clone(),
            None => package_name_from_path(path),
        };
        package_logs.push(PackageLog {
            package,
            path: path.clone(),
        });
    }

    Ok(package_logs)
}

/// Packages under a log base directory, sorted by name
///
/// A package is any sub-directory containing `stdout_stderr.log`.
pub fn discover_package_logs(log_base: &Path) -> Result<Vec<PackageLog>> {
    let entries = std::fs::read_dir(log_base)
        .with_context(|| format!("Failed to read log directory {}", log_base.display()))?;

    let mut package_logs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| {
            format!("Failed to read log directory {}", log_base.display())
        })?;
        let path = entry.path().join(PACKAGE_LOG_FILE_NAME);
        if !path.is_file() {
            continue;
        }
        package_logs.push(PackageLog {
            package: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }

    package_logs.sort_by(|a, b| a.package.cmp(&b.package));
    Ok(package_logs)
}

/// Package name of a log: the name of the directory holding it
fn package_name_from_path(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Validate report arguments
///
/// **Public** - can be called before execute_report for early validation
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if args.log_base.is_none() && args.logs.is_empty() {
        anyhow::bail!("No input: pass a log base directory or at least one log file");
    }

    if args.package.is_some() && args.logs.len() != 1 {
        anyhow::bail!("A package name can only be given for exactly one log file");
    }

    if args.parser_config.project_marker.is_empty() {
        anyhow::bail!("Project marker cannot be empty");
    }

    if args.output_csv == args.output_xml {
        anyhow::bail!("CSV and XML reports cannot be written to the same file");
    }

    if args.top_keys == 0 {
        anyhow::bail!("top_keys must be greater than 0");
    }

    Ok(())
}
