//! Prioritizing, paging and sizing of scan results.
//!
//! A scan can produce far more issues than a caller can take in one
//! response. [`build_report`] sorts them, applies the caller's offset, then
//! keeps the longest prefix whose serialized report fits the character
//! budget. The number of issues left over is always reported so the caller
//! can page through the rest.
//!
//! Per-file scan errors share the same budget. Issues are sized first;
//! whatever room is left is filled with errors in scan order, and the
//! number that did not fit is reported as `errors_omitted`.

use std::collections::HashMap;

use super::{ConformanceIssue, FileError, FileIssues, IssueReport, ScanOutcome, ScanSummary};

/// Fraction of the proportional estimate used as the first probe.
const SEED_RATIO: f64 = 0.95;

/// Upper bound on passes needed for `response_size_chars` to settle.
const MAX_SIZE_PASSES: usize = 8;

/// Sort issues: doc comments, then file comments, then READMEs; within a
/// priority by file, then line.
pub fn prioritize(issues: &mut [ConformanceIssue]) {
    issues.sort_by(|a, b| {
        a.issue
            .priority()
            .cmp(&b.issue.priority())
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.issue.cmp(&b.issue))
            .then_with(|| a.element.cmp(&b.element))
    });
}

/// Serialized form of a report, as emitted to callers and as measured
/// against the budget.
pub fn to_json(report: &IssueReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Build one page of results that fits in `budget` characters.
///
/// The page is never empty while issues remain past `offset`: a single
/// issue is returned even if it alone exceeds the budget. File errors are
/// only kept while they fit next to the chosen issues.
pub fn build_report(
    path: &str,
    outcome: ScanOutcome,
    offset: usize,
    budget: usize,
) -> serde_json::Result<IssueReport> {
    let ScanOutcome {
        mut issues,
        errors,
        files_scanned,
    } = outcome;

    let summary = ScanSummary::from_issues(files_scanned, &issues);
    prioritize(&mut issues);
    let total = issues.len();

    let page = Page {
        path,
        summary,
        errors,
        total,
        offset,
        budget,
    };

    let candidates = issues.get(offset..).unwrap_or(&[]);

    let full = page.sized(candidates, page.errors.len())?;
    if full.response_size_chars <= budget {
        return Ok(full);
    }

    let bare = page.sized(candidates, 0)?;
    let returned = if bare.response_size_chars <= budget {
        candidates.len()
    } else {
        let seed = (candidates.len() as f64 * budget as f64 / bare.response_size_chars as f64
            * SEED_RATIO) as usize;
        largest_fitting(candidates.len(), seed, |n| page.fits(&candidates[..n], 0))?.max(1)
    };
    let issues = &candidates[..returned.min(candidates.len())];

    let kept = largest_fitting(page.errors.len(), 0, |k| page.fits(issues, k))?;
    log::debug!(
        "sized scan response to {} of {} issues and {} of {} errors for budget {}",
        issues.len(),
        candidates.len(),
        kept,
        page.errors.len(),
        budget
    );

    page.sized(issues, kept)
}

/// Largest `n` below `len` for which `fits(n)` holds, given that `fits(len)`
/// does not; 0 when no smaller prefix fits either. A `seed` in `1..len` is
/// tried first to narrow the search.
fn largest_fitting(
    len: usize,
    seed: usize,
    mut fits: impl FnMut(usize) -> serde_json::Result<bool>,
) -> serde_json::Result<usize> {
    // `lo` fits (or is zero), `hi` does not.
    let mut lo = 0;
    let mut hi = len;

    if seed >= 1 && seed < hi {
        if fits(seed)? {
            lo = seed;
        } else {
            hi = seed;
        }
    }

    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

/// Fields shared by every candidate page.
struct Page<'a> {
    path: &'a str,
    summary: ScanSummary,
    errors: Vec<FileError>,
    total: usize,
    offset: usize,
    budget: usize,
}

impl Page<'_> {
    /// Rendered and measured page with `issues` and the first `errors` errors.
    fn sized(
        &self,
        issues: &[ConformanceIssue],
        errors: usize,
    ) -> serde_json::Result<IssueReport> {
        let mut report = self.render(issues, errors);
        measure(&mut report)?;
        Ok(report)
    }

    fn fits(&self, issues: &[ConformanceIssue], errors: usize) -> serde_json::Result<bool> {
        Ok(self.sized(issues, errors)?.response_size_chars <= self.budget)
    }

    fn render(&self, issues: &[ConformanceIssue], errors: usize) -> IssueReport {
        let returned = issues.len();
        let remaining = self.total.saturating_sub(self.offset + returned);
        let kept = &self.errors[..errors.min(self.errors.len())];
        let errors_omitted = self.errors.len() - kept.len();

        let mut notes = Vec::new();
        if self.offset >= self.total && self.total > 0 {
            notes.push(format!(
                "offset {} is past the end of the results ({} issues total)",
                self.offset, self.total
            ));
        } else if remaining > 0 {
            notes.push(format!(
                "Showing {} of {} issues starting at offset {}; use offset {} to fetch the next page",
                returned,
                self.total,
                self.offset,
                self.offset + returned
            ));
        }
        if errors_omitted > 0 {
            notes.push(format!(
                "{} of {} file errors omitted to fit the response budget",
                errors_omitted,
                self.errors.len()
            ));
        }

        IssueReport {
            path: self.path.to_string(),
            issues_by_file: group_by_file(issues),
            summary: self.summary.clone(),
            returned_count: returned,
            total_count: self.total,
            remaining_count: remaining,
            size_limited: remaining > 0 || errors_omitted > 0,
            response_size_chars: 0,
            message: (!notes.is_empty()).then(|| notes.join("; ")),
            errors: kept.to_vec(),
            errors_omitted,
        }
    }
}

/// Group issues by file, files in order of first appearance.
fn group_by_file(issues: &[ConformanceIssue]) -> Vec<FileIssues> {
    let mut groups: Vec<FileIssues> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for issue in issues {
        let slot = *index.entry(issue.file.as_str()).or_insert_with(|| {
            groups.push(FileIssues {
                file: issue.file.clone(),
                issue_count: 0,
                issues: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].issue_count += 1;
        groups[slot].issues.push(issue.clone());
    }

    groups
}

/// Set `response_size_chars` to the size of the serialization that carries it.
fn measure(report: &mut IssueReport) -> serde_json::Result<()> {
    for _ in 0..MAX_SIZE_PASSES {
        let size = to_json(report)?.chars().count();
        if size == report.response_size_chars {
            break;
        }
        report.response_size_chars = size;
    }
    Ok(())
}
