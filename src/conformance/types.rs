//! Core types for conformance results.

use serde::Serialize;
use std::collections::BTreeMap;

/// Kind of documentation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    FileComment,
    FuncComment,
    TypeComment,
    ConstComment,
    VarComment,
    GroupComment,
    ReadmeMissing,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::FileComment => "file-comment",
            IssueType::FuncComment => "func-comment",
            IssueType::TypeComment => "type-comment",
            IssueType::ConstComment => "const-comment",
            IssueType::VarComment => "var-comment",
            IssueType::GroupComment => "group-comment",
            IssueType::ReadmeMissing => "readme-missing",
        }
    }

    /// Sort rank; lower is more urgent.
    pub fn priority(&self) -> u8 {
        match self {
            IssueType::FuncComment
            | IssueType::TypeComment
            | IssueType::ConstComment
            | IssueType::VarComment
            | IssueType::GroupComment => 0,
            IssueType::FileComment => 1,
            IssueType::ReadmeMissing => 2,
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single undocumented element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceIssue {
    /// Path relative to the scan root, `/`-separated.
    pub file: String,
    /// 1-based line; 0 for directory-level issues.
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    pub issue: IssueType,
    /// `Name`, `Recv.Name`, `const (A, B)` or a directory name.
    pub element: String,
    pub multi_line: bool,
}

/// A file the scanner could not read or parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Raw scanner output, before prioritizing and sizing.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Issues in walk order.
    pub issues: Vec<ConformanceIssue>,
    pub errors: Vec<FileError>,
    pub files_scanned: usize,
}

/// Issues for one file, in priority order.
#[derive(Debug, Clone, Serialize)]
pub struct FileIssues {
    pub file: String,
    pub issue_count: usize,
    pub issues: Vec<ConformanceIssue>,
}

/// Totals over the whole scan, independent of paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub files_with_issues: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl ScanSummary {
    pub fn from_issues(files_scanned: usize, issues: &[ConformanceIssue]) -> Self {
        let mut by_type = BTreeMap::new();
        let mut files = std::collections::HashSet::new();
        for issue in issues {
            *by_type.entry(issue.issue.as_str().to_string()).or_insert(0) += 1;
            if issue.issue != IssueType::ReadmeMissing {
                files.insert(issue.file.as_str());
            }
        }
        Self {
            files_scanned,
            files_with_issues: files.len(),
            by_type,
        }
    }
}

/// One page of a scan, sized to fit the response budget.
#[derive(Debug, Clone, Serialize)]
pub struct IssueReport {
    pub path: String,
    pub issues_by_file: Vec<FileIssues>,
    pub summary: ScanSummary,
    pub returned_count: usize,
    pub total_count: usize,
    pub remaining_count: usize,
    pub size_limited: bool,
    pub response_size_chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Files that could not be scanned, as many as fit the budget.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
    /// Errors left out of `errors` to stay within the budget.
    #[serde(skip_serializing_if = "is_zero")]
    pub errors_omitted: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl IssueReport {
    /// Issues on this page, flattened in order.
    pub fn issues(&self) -> impl Iterator<Item = &ConformanceIssue> {
        self.issues_by_file.iter().flat_map(|g| g.issues.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.total_count == 0
    }
}
