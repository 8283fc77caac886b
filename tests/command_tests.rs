use sanitizer_reports::commands::{discover_package_logs, execute_report, validate_args, ReportArgs};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DATA_RACE: &str = include_str!("fixtures/data_race_different_keys.log");
const MEMORY_LEAKS: &str = include_str!("fixtures/detected_memory_leaks.log");
const NO_ERRORS: &str = include_str!("fixtures/no_errors.log");
const UNTERMINATED: &str = include_str!("fixtures/unterminated.log");

fn write_package_log(log_base: &Path, package: &str, contents: &str) -> PathBuf {
    let dir = log_base.join(package);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("stdout_stderr.log");
    fs::write(&path, contents).unwrap();
    path
}

fn report_args(temp_dir: &TempDir) -> ReportArgs {
    ReportArgs {
        output_csv: temp_dir.path().join("out/sanitizer_report.csv"),
        output_xml: temp_dir.path().join("out/test_results.xml"),
        ..Default::default()
    }
}

#[test]
fn test_report_from_log_base() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log_base = temp_dir.path().join("log/latest_test");
    write_package_log(&log_base, "rclcpp", MEMORY_LEAKS);
    write_package_log(&log_base, "demo", DATA_RACE);
    write_package_log(&log_base, "clean", NO_ERRORS);

    let args = ReportArgs {
        log_base: Some(log_base),
        output_summary: Some(temp_dir.path().join("out/summary.json")),
        ..report_args(&temp_dir)
    };
    validate_args(&args).unwrap();
    execute_report(args.clone()).unwrap();

    let csv = fs::read_to_string(&args.output_csv).unwrap();
    assert!(csv.starts_with("package,error_name,stack_trace_key,count,sample_stack_trace\n"));
    assert!(csv.contains("demo,data race,"));
    assert!(csv.contains("rclcpp,detected memory leaks,"));
    assert!(!csv.contains("clean,"));

    let xml = fs::read_to_string(&args.output_xml).unwrap();
    assert!(xml.contains(r#"<testsuite tests="2">"#));

    let summary = sanitizer_reports::output::read_summary(args.output_summary.unwrap()).unwrap();
    assert_eq!(summary.distinct_keys, 4);
    assert_eq!(summary.total_occurrences, 5);
}

#[test]
fn test_missing_log_is_skipped() {
    let temp_dir = tempfile::tempdir().unwrap();
    let present = write_package_log(temp_dir.path(), "demo", DATA_RACE);

    let args = ReportArgs {
        logs: vec![temp_dir.path().join("missing/stdout_stderr.log"), present],
        ..report_args(&temp_dir)
    };
    execute_report(args.clone()).unwrap();

    let csv = fs::read_to_string(&args.output_csv).unwrap();
    assert!(csv.contains("demo,data race,"));
    assert!(!csv.contains("missing"));
}

#[test]
fn test_clean_logs_produce_empty_reports() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log = write_package_log(temp_dir.path(), "demo", NO_ERRORS);

    let args = ReportArgs {
        logs: vec![log],
        ..report_args(&temp_dir)
    };
    execute_report(args.clone()).unwrap();

    assert_eq!(
        fs::read_to_string(&args.output_csv).unwrap(),
        "package,error_name,stack_trace_key,count,sample_stack_trace\n"
    );
    assert!(fs::read_to_string(&args.output_xml)
        .unwrap()
        .contains(r#"<testsuite tests="0"/>"#));
}

#[test]
fn test_unterminated_section_stays_in_its_package() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_package_log(temp_dir.path(), "a", UNTERMINATED);
    write_package_log(
        temp_dir.path(),
        "b",
        "[t] WARNING: ThreadSanitizer: data race (pid=2)\n\
         [t]   Read of size 4 at 0x1000 by thread T1:\n\
         [t]     #0 0x4011 in rd() /ros2/src/b.cpp:3\n\
         [t] SUMMARY: ThreadSanitizer: data race /ros2/src/b.cpp:3 in rd()\n",
    );

    let args = ReportArgs {
        log_base: Some(temp_dir.path().to_path_buf()),
        ..report_args(&temp_dir)
    };
    execute_report(args.clone()).unwrap();

    let csv = fs::read_to_string(&args.output_csv).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("b,data race,rd() /ros2/src/b.cpp:3,1,"));
    assert!(!csv.contains("worker()"));
}

#[test]
fn test_fatal_parse_error_writes_no_report() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log = write_package_log(
        temp_dir.path(),
        "demo",
        "==1==ERROR: AddressSanitizer: SEGV on unknown address 0x000000000000\n\
         \x20   #0 0x7f0c18a1b0b2 in raise (/lib/x86_64-linux-gnu/libc.so.6+0x270b2)\n\
         SUMMARY: AddressSanitizer: SEGV (/lib/x86_64-linux-gnu/libc.so.6+0x270b2)\n",
    );

    let args = ReportArgs {
        logs: vec![log],
        ..report_args(&temp_dir)
    };
    let result = execute_report(args.clone());

    assert!(result.is_err());
    assert!(!args.output_csv.exists());
    assert!(!args.output_xml.exists());
}

#[test]
fn test_discover_package_logs_sorted() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_package_log(temp_dir.path(), "zeta", NO_ERRORS);
    write_package_log(temp_dir.path(), "alpha", NO_ERRORS);
    fs::create_dir_all(temp_dir.path().join("no_log_here")).unwrap();
    fs::write(temp_dir.path().join("stray.txt"), "x").unwrap();

    let packages: Vec<String> = discover_package_logs(temp_dir.path())
        .unwrap()
        .into_iter()
        .map(|log| log.package)
        .collect();

    assert_eq!(packages, vec!["alpha", "zeta"]);
}

#[test]
fn test_missing_log_base_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(discover_package_logs(&temp_dir.path().join("nope")).is_err());
}
