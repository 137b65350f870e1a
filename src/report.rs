//! Output formatting for structedit results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the response objects exactly as a tool caller receives them

use colored::*;
use serde::Serialize;

use crate::conformance::{self, ConformanceIssue, IssueReport, IssueType};
use crate::edit::{EditError, ListResponse, LocateResponse, ReplaceResponse};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            _ => Err(format!(
                "invalid format {:?}, must be 'pretty' or 'json'",
                s
            )),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Error payload for a refused request.
#[derive(Serialize)]
pub struct JsonError<'a> {
    pub success: bool,
    pub category: &'a str,
    pub error: String,
}

/// Write any response as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Write a scan report in the same serialization its size was measured in.
pub fn write_scan_json(report: &IssueReport) -> anyhow::Result<()> {
    println!("{}", conformance::to_json(report)?);
    Ok(())
}

pub fn write_error_json(err: &EditError) -> anyhow::Result<()> {
    write_json(&JsonError {
        success: false,
        category: err.category(),
        error: err.to_string(),
    })
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(action: &str, path: &str) {
    println!();
    print!("  ");
    print!("{}", "structedit".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", format!("{:<10}", action).dimmed());
    println!("{}", path);
    println!();
}

/// Write a declaration listing.
pub fn write_list_pretty(resp: &ListResponse) {
    write_header("Listing:", &resp.file_path);

    if let Some(pkg) = &resp.package {
        println!("  {} {}", "package".dimmed(), pkg.bold());
        println!();
    }

    println!(
        "  {} ({}):",
        "Declarations".bold(),
        resp.declarations.len()
    );
    println!();
    for d in &resp.declarations {
        let marker = if d.documented {
            "✓".green()
        } else {
            "·".dimmed()
        };
        print!("    {} ", marker);
        print!("{:<10}", d.kind.dimmed());
        print!("{:<32}", d.name);
        let extent = format!(
            "lines {}-{}  bytes {}..{}",
            d.start_line, d.end_line, d.start_offset, d.end_offset
        );
        println!("{}", extent.dimmed());
    }
    println!();
}

/// Write a locate result, including the construct's text.
pub fn write_locate_pretty(resp: &LocateResponse) {
    write_header("Locating:", &resp.file_path);

    if !resp.found {
        println!(
            "  {}  {} '{}' not found",
            "✗".red(),
            resp.part_type,
            resp.part_name
        );
        println!();
        return;
    }

    println!(
        "  {}  {} {} {}",
        "✓".green(),
        resp.part_type.dimmed(),
        resp.part_name.bold(),
        format!(
            "(lines {}-{}, bytes {}..{})",
            resp.start_line, resp.end_line, resp.start_offset, resp.end_offset
        )
        .dimmed()
    );
    println!();
    for (i, line) in resp.content.lines().enumerate() {
        println!(
            "  {} {}",
            format!("{:>5} │", resp.start_line + i).dimmed(),
            line
        );
    }
    println!();
}

pub fn write_replace_pretty(resp: &ReplaceResponse) {
    write_header("Editing:", &resp.file_path);
    println!("  {}  {}", "✓".green(), resp.message);
    println!();
}

/// Write a refused edit.
pub fn write_error_pretty(err: &EditError) {
    eprintln!(
        "  {}  {} {}",
        "✗".red(),
        format!("[{}]", err.category()).dimmed(),
        err
    );
}

/// Write one page of scan results.
pub fn write_scan_pretty(report: &IssueReport) {
    write_header("Scanning:", &report.path);

    write_scan_summary(report);
    println!();

    if !report.issues_by_file.is_empty() {
        println!(
            "  {} ({} of {}):",
            "Issues".bold(),
            report.returned_count,
            report.total_count
        );
        println!();
        for group in &report.issues_by_file {
            println!("    {} {}", group.file.blue(), format!("({})", group.issue_count).dimmed());
            for issue in &group.issues {
                write_issue(issue);
            }
            println!();
        }
    }

    if !report.errors.is_empty() || report.errors_omitted > 0 {
        let total = report.errors.len() + report.errors_omitted;
        println!("  {} ({}):", "Errors".red().bold(), total);
        for e in &report.errors {
            println!("    {}  {}", e.file.blue(), e.error);
        }
        if report.errors_omitted > 0 {
            println!("    {}", format!("... {} more", report.errors_omitted).dimmed());
        }
        println!();
    }

    if let Some(message) = &report.message {
        println!("  {}", message.yellow());
        println!();
    }
}

fn write_scan_summary(report: &IssueReport) {
    if report.is_clean() {
        print!("  {}", "✓ CLEAN".green());
    } else {
        print!("  {}", "✗ ISSUES".red());
    }
    print!(
        "  files: {}  with issues: {}  total: {}",
        report.summary.files_scanned, report.summary.files_with_issues, report.total_count
    );
    println!();

    if !report.summary.by_type.is_empty() {
        println!();
        for (kind, count) in &report.summary.by_type {
            println!("    {:<18} {:>4}", kind, count);
        }
    }
}

fn write_issue(issue: &ConformanceIssue) {
    write_issue_tag(issue.issue);
    print!("{:<16}", issue.issue.as_str().dimmed());
    print!("{}", issue_location(issue).dimmed());
    if !issue.element.is_empty() {
        print!("  {}", issue.element);
    }
    println!();
}

fn write_issue_tag(kind: IssueType) {
    match kind.priority() {
        0 => print!("      {} ", "DOC ".yellow()),
        1 => print!("      {} ", "FILE".blue()),
        _ => print!("      {} ", "DIR ".dimmed()),
    }
}

/// `:12`, `:12-18`, or nothing for directory-level issues.
pub fn issue_location(issue: &ConformanceIssue) -> String {
    match (issue.line, issue.end_line) {
        (0, _) => String::new(),
        (start, Some(end)) if end > start => format!(":{}-{}", start, end),
        (start, _) => format!(":{}", start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(line: usize, end_line: Option<usize>) -> ConformanceIssue {
        ConformanceIssue {
            file: "a.go".to_string(),
            line,
            end_line,
            issue: IssueType::FuncComment,
            element: "Run".to_string(),
            multi_line: end_line.is_some(),
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("Pretty".parse::<Format>(), Ok(Format::Pretty));
        assert!("sarif".parse::<Format>().is_err());
    }

    #[test]
    fn test_issue_location() {
        assert_eq!(issue_location(&issue(0, None)), "");
        assert_eq!(issue_location(&issue(4, None)), ":4");
        assert_eq!(issue_location(&issue(4, Some(9))), ":4-9");
    }

    #[test]
    fn test_json_error_shape() {
        let err = EditError::NotFound {
            kind: "function".to_string(),
            name: "Run".to_string(),
        };
        let json = serde_json::to_value(JsonError {
            success: false,
            category: err.category(),
            error: err.to_string(),
        })
        .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["category"], "not_found");
        assert_eq!(json["error"], "function 'Run' not found in file");
    }
}
