//! Documentation conformance scanning.
//!
//! Walks a file or directory, indexes every eligible source file and emits
//! one issue per undocumented element. Files are analyzed in parallel with
//! rayon; results keep walk order.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::analysis::{get_analyzer, Declaration, DeclarationKind, FileFacts};
use crate::config::Config;

use super::{ConformanceIssue, FileError, IssueType, ScanOutcome};

/// Options controlling which files are scanned and what is reported.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub recursive: bool,
    pub include_test_files: bool,
    pub exported_only: bool,
    pub skip_dirs: Vec<String>,
    pub excluded: GlobSet,
    pub readme_names: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let config = Config::default();
        Self {
            recursive: false,
            include_test_files: config.include_test_files,
            exported_only: config.exported_only,
            skip_dirs: config.skip_dirs,
            excluded: GlobSet::empty(),
            readme_names: config.readme_names,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &Config, recursive: bool) -> anyhow::Result<Self> {
        Ok(Self {
            recursive,
            include_test_files: config.include_test_files,
            exported_only: config.exported_only,
            skip_dirs: config.skip_dirs.clone(),
            excluded: config.excluded_matcher()?,
            readme_names: config.readme_names.clone(),
        })
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn skips_dir(&self, name: &str) -> bool {
        name.starts_with('.') || self.skip_dirs.iter().any(|d| d == name)
    }

    fn is_readme(&self, name: &str) -> bool {
        self.readme_names.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// A file selected for scanning.
struct Candidate {
    path: PathBuf,
    /// Relative to the scan root, `/`-separated.
    display: String,
}

/// Scan `root` for missing documentation.
///
/// A single-file root is scanned regardless of the directory filters. The
/// scan itself only fails when `root` cannot be accessed; per-file failures
/// end up in [`ScanOutcome::errors`].
pub fn scan(root: &Path, options: &ScanOptions) -> anyhow::Result<ScanOutcome> {
    let metadata = fs::metadata(root)
        .map_err(|e| anyhow::anyhow!("cannot access path {}: {}", root.display(), e))?;

    let mut outcome = ScanOutcome::default();
    let mut readme_issues = Vec::new();

    let candidates = if metadata.is_dir() {
        let (candidates, dirs) = collect_files(root, options, &mut outcome.errors);
        for dir in dirs {
            if !has_readme(&root.join(&dir), options) {
                readme_issues.push(readme_missing(&dir));
            }
        }
        candidates
    } else {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        vec![Candidate {
            path: root.to_path_buf(),
            display: name,
        }]
    };

    log::info!(
        "scanning {} file(s) under {}",
        candidates.len(),
        root.display()
    );

    let results: Vec<Result<Vec<ConformanceIssue>, FileError>> = candidates
        .par_iter()
        .map(|candidate| scan_file(candidate, options))
        .collect();

    for result in results {
        match result {
            Ok(issues) => {
                outcome.files_scanned += 1;
                outcome.issues.extend(issues);
            }
            Err(err) => {
                log::warn!("skipping {}: {}", err.file, err.error);
                outcome.errors.push(err);
            }
        }
    }
    outcome.issues.extend(readme_issues);

    Ok(outcome)
}

/// Eligible files in walk order, plus the subdirectories that hold any.
fn collect_files(
    root: &Path,
    options: &ScanOptions,
    errors: &mut Vec<FileError>,
) -> (Vec<Candidate>, BTreeSet<String>) {
    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    let mut source_dirs = BTreeSet::new();

    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !options.skips_dir(&e.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let file = e
                    .path()
                    .map(|p| relative_display(root, p))
                    .unwrap_or_default();
                errors.push(FileError {
                    file,
                    error: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if get_analyzer(ext).is_none() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !options.include_test_files && name.ends_with("_test.go") {
            continue;
        }
        let display = relative_display(root, path);
        if options.excluded.is_match(&display) {
            log::debug!("excluded {}", display);
            continue;
        }

        if let Some((dir, _)) = display.rsplit_once('/') {
            source_dirs.insert(dir.to_string());
        }
        files.push(Candidate {
            path: path.to_path_buf(),
            display,
        });
    }

    (files, source_dirs)
}

fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_readme(dir: &Path, options: &ScanOptions) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .any(|e| options.is_readme(&e.file_name().to_string_lossy())),
        // Unreadable directories were already reported by the walk.
        Err(_) => true,
    }
}

fn readme_missing(dir: &str) -> ConformanceIssue {
    ConformanceIssue {
        file: dir.to_string(),
        line: 0,
        end_line: None,
        issue: IssueType::ReadmeMissing,
        element: dir.rsplit('/').next().unwrap_or(dir).to_string(),
        multi_line: false,
    }
}

fn scan_file(
    candidate: &Candidate,
    options: &ScanOptions,
) -> Result<Vec<ConformanceIssue>, FileError> {
    let fail = |error: String| FileError {
        file: candidate.display.clone(),
        error,
    };

    let ext = candidate
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let analyzer =
        get_analyzer(ext).ok_or_else(|| fail(format!("no grammar for extension '{}'", ext)))?;
    let source = fs::read(&candidate.path).map_err(|e| fail(e.to_string()))?;
    let facts = analyzer
        .index(&candidate.path, &source)
        .map_err(|e| fail(e.to_string()))?;

    Ok(file_issues(&facts, &candidate.display, options.exported_only))
}

/// Documentation issues for one indexed file, in source order.
pub fn file_issues(facts: &FileFacts, file: &str, exported_only: bool) -> Vec<ConformanceIssue> {
    let mut issues = Vec::new();

    if !facts.has_file_comment {
        issues.push(ConformanceIssue {
            file: file.to_string(),
            line: 1,
            end_line: None,
            issue: IssueType::FileComment,
            element: String::new(),
            multi_line: false,
        });
    }

    for decl in &facts.declarations {
        if !decl.kind.is_documentable() || decl.has_leading_comment {
            continue;
        }
        if exported_only && !is_exported_decl(decl) {
            continue;
        }
        let (issue, element) = classify(decl);
        let multi_line = decl.span.is_multi_line();
        issues.push(ConformanceIssue {
            file: file.to_string(),
            line: decl.span.start_line,
            end_line: multi_line.then_some(decl.span.end_line),
            issue,
            element,
            multi_line,
        });
    }

    issues
}

fn classify(decl: &Declaration) -> (IssueType, String) {
    if decl.kind.is_callable() {
        return (IssueType::FuncComment, decl.qualified_name());
    }
    if decl.grouped {
        return (
            IssueType::GroupComment,
            format!("{} ({})", decl.kind, decl.members.join(", ")),
        );
    }
    let issue = match decl.kind {
        DeclarationKind::Type => IssueType::TypeComment,
        DeclarationKind::Var => IssueType::VarComment,
        _ => IssueType::ConstComment,
    };
    let element = if decl.members.len() > 1 {
        decl.members.join(", ")
    } else {
        decl.name.clone()
    };
    (issue, element)
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn is_exported_decl(decl: &Declaration) -> bool {
    if decl.kind.is_callable() {
        return is_exported(&decl.name);
    }
    is_exported(&decl.name) || decl.members.iter().any(|m| is_exported(m))
}
