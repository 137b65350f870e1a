//! Documentation conformance checks over a file tree.

mod aggregate;
mod scanner;
mod types;

use std::path::Path;

pub use aggregate::{build_report, prioritize, to_json};
pub use scanner::{file_issues, scan, ScanOptions};
pub use types::{
    ConformanceIssue, FileError, FileIssues, IssueReport, IssueType, ScanOutcome, ScanSummary,
};

/// Scan `root` and return the page of issues starting at `offset` that fits
/// in `budget` characters.
pub fn check(
    root: &Path,
    options: &ScanOptions,
    offset: usize,
    budget: usize,
) -> anyhow::Result<IssueReport> {
    let outcome = scan(root, options)?;
    let report = build_report(&root.display().to_string(), outcome, offset, budget)?;
    log::info!(
        "scan of {} found {} issue(s), returned {}",
        root.display(),
        report.total_count,
        report.returned_count
    );
    Ok(report)
}
