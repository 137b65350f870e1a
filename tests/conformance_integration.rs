//! Integration tests for the documentation scan pipeline.
//!
//! These tests run the scanner and aggregator against the Go fixtures in
//! testdata and check what a caller would receive.

use std::fs;
use std::path::PathBuf;

use structedit::conformance::{self, IssueType, ScanOptions};
use structedit::Config;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn recursive() -> ScanOptions {
    ScanOptions::default().recursive(true)
}

#[test]
fn test_undocumented_const_file() {
    let root = testdata_path().join("server");
    let report = conformance::check(&root, &ScanOptions::default(), 0, 40_000).unwrap();

    let found: Vec<_> = report
        .issues()
        .map(|i| (i.issue, i.element.as_str(), i.line))
        .collect();
    assert_eq!(
        found,
        vec![
            (IssueType::ConstComment, "ServerPort", 3),
            (IssueType::FileComment, "", 1),
        ]
    );
    assert_eq!(report.total_count, 2);
    assert_eq!(report.summary.files_scanned, 1);
    assert!(report.errors.is_empty());
}

#[test]
fn test_single_file_root() {
    let file = testdata_path().join("server").join("config.go");
    let report = conformance::check(&file, &ScanOptions::default(), 0, 40_000).unwrap();
    assert_eq!(report.total_count, 2);
    assert_eq!(report.issues_by_file[0].file, "config.go");
}

#[test]
fn test_recursive_tree_scan() {
    let root = testdata_path().join("tree");
    let report = conformance::check(&root, &recursive(), 0, 40_000).unwrap();

    let found: Vec<_> = report
        .issues()
        .map(|i| (i.issue, i.file.as_str(), i.element.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (IssueType::FuncComment, "pkg/util/util.go", "Clamp"),
            (IssueType::GroupComment, "pkg/util/util.go", "var (Debug, Verbose)"),
            (IssueType::TypeComment, "pkg/util/util.go", "Pair"),
            (IssueType::FileComment, "pkg/util/util.go", ""),
            (IssueType::ReadmeMissing, "broken", "broken"),
            (IssueType::ReadmeMissing, "pkg/util", "util"),
        ]
    );

    // vendor/ and main_test.go are skipped; broken/bad.go fails to parse
    assert_eq!(report.summary.files_scanned, 3);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].file, "broken/bad.go");
    assert!(report.errors[0].error.starts_with("line 4"));
}

#[test]
fn test_non_recursive_scan_stays_at_top() {
    let root = testdata_path().join("tree");
    let report = conformance::check(&root, &ScanOptions::default(), 0, 40_000).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.summary.files_scanned, 1);
    assert!(report.errors.is_empty());
}

#[test]
fn test_config_options_flow_into_scan() {
    let config = Config {
        include_test_files: true,
        exported_only: true,
        excluded_paths: vec!["broken/**".to_string()],
        ..Default::default()
    };
    let options = ScanOptions::from_config(&config, true).unwrap();
    let report = conformance::check(&testdata_path().join("tree"), &options, 0, 40_000).unwrap();

    // helperForTests is unexported; broken/ is excluded entirely
    assert!(report.errors.is_empty());
    assert!(report.issues().all(|i| i.file != "broken"));
    assert_eq!(report.summary.files_scanned, 4);
    assert_eq!(report.summary.by_type["file-comment"], 2);
}

#[test]
fn test_budget_and_paging() {
    let temp = TempDir::new().unwrap();
    for i in 0..30 {
        let body: String = (0..10)
            .map(|f| format!("func F{}_{}() {{}}\n\n", i, f))
            .collect();
        fs::write(
            temp.path().join(format!("f{:02}.go", i)),
            format!("package many\n\n{}", body),
        )
        .unwrap();
    }

    let budget = 5_000;
    let first = conformance::check(temp.path(), &ScanOptions::default(), 0, budget).unwrap();
    assert_eq!(first.total_count, 330);
    assert!(first.size_limited);
    assert!(first.response_size_chars <= budget);
    assert_eq!(first.returned_count + first.remaining_count, first.total_count);
    assert_eq!(
        first.response_size_chars,
        conformance::to_json(&first).unwrap().chars().count()
    );

    // Doc-comment issues come before every file-comment issue.
    let kinds: Vec<_> = first.issues().map(|i| i.issue).collect();
    assert!(kinds.iter().all(|k| *k == IssueType::FuncComment));

    let offset = first.returned_count;
    let second = conformance::check(temp.path(), &ScanOptions::default(), offset, budget).unwrap();
    assert_eq!(
        second.remaining_count,
        first.total_count - offset - second.returned_count
    );
    assert_ne!(
        first.issues().next().unwrap(),
        second.issues().next().unwrap()
    );

    let past = conformance::check(temp.path(), &ScanOptions::default(), 1_000, budget).unwrap();
    assert_eq!(past.returned_count, 0);
    assert_eq!(past.remaining_count, 0);
    assert!(past.message.is_some());
}

#[test]
fn test_unparsable_files_share_the_budget() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.go"), "package p\n\nfunc A() {}\n").unwrap();
    for i in 0..300 {
        fs::write(
            temp.path().join(format!("b{:03}.go", i)),
            "package p\n\nfunc B( {\n",
        )
        .unwrap();
    }

    let budget = 5_000;
    let report = conformance::check(temp.path(), &ScanOptions::default(), 0, budget).unwrap();

    assert!(report.response_size_chars <= budget);
    assert_eq!(
        report.response_size_chars,
        conformance::to_json(&report).unwrap().chars().count()
    );
    // Every issue still fits; only the error list is cut.
    assert_eq!(report.total_count, 2);
    assert_eq!(report.returned_count, 2);
    assert_eq!(report.remaining_count, 0);
    assert!(report.errors_omitted > 0);
    assert_eq!(report.errors.len() + report.errors_omitted, 300);
    assert!(report.size_limited);
}

#[test]
fn test_missing_root_is_an_error() {
    let root = testdata_path().join("does-not-exist");
    assert!(conformance::check(&root, &ScanOptions::default(), 0, 40_000).is_err());
}
