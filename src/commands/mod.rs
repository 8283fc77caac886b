//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod report;

// Re-export main command functions
pub use report::{
    collect_package_logs, discover_package_logs, execute_report, parse_log_file, validate_args,
    PackageLog, ReportArgs,
};
