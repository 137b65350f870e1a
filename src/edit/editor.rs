//! Locate, list and replace operations over a single file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::capability::{resolve_language, resolve_part_type, PartCapability};
use super::error::EditError;
use super::lock::FileLocks;
use super::store::{FsStore, PathGuard, SourceStore};
use crate::analysis::{get_analyzer, Declaration, FileFacts, LanguageAnalyzer, Span};

/// Result of a locate request. `found: false` is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocateResponse {
    pub found: bool,
    pub part_type: String,
    pub part_name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub content: String,
    pub file_path: String,
}

/// Result of a successful replace request.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceResponse {
    pub success: bool,
    pub file_path: String,
    pub language: String,
    pub part_type: String,
    pub part_name: String,
    pub message: String,
}

/// One declaration as shown by `list`.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationSummary {
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub documented: bool,
}

impl From<&Declaration> for DeclarationSummary {
    fn from(d: &Declaration) -> Self {
        Self {
            kind: d.kind.to_string(),
            name: d.qualified_name(),
            receiver: d.receiver.clone(),
            members: if d.members.len() > 1 {
                d.members.clone()
            } else {
                Vec::new()
            },
            start_line: d.span.start_line,
            end_line: d.span.end_line,
            start_offset: d.span.start_byte,
            end_offset: d.span.end_byte,
            documented: d.has_leading_comment,
        }
    }
}

/// Result of a list request.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub file_path: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub declarations: Vec<DeclarationSummary>,
}

/// A replace request as received from a caller.
#[derive(Debug, Clone)]
pub struct ReplaceRequest {
    pub path: PathBuf,
    /// Grammar identifier; inferred from the extension when absent.
    pub language: Option<String>,
    pub part_type: String,
    pub part_name: String,
    pub new_content: String,
}

/// Substitute `span` in `source`; bytes outside the span are copied as-is.
pub fn splice(source: &[u8], span: &Span, replacement: &[u8]) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(source.len() - (span.end_byte - span.start_byte) + replacement.len());
    out.extend_from_slice(&source[..span.start_byte]);
    out.extend_from_slice(replacement);
    out.extend_from_slice(&source[span.end_byte..]);
    out
}

/// Structural editor over a [`SourceStore`].
///
/// Holds no per-request state; the lock table only serializes concurrent
/// edits of the same file.
pub struct Editor<S: SourceStore = FsStore> {
    store: S,
    locks: FileLocks,
}

impl Editor<FsStore> {
    /// Filesystem-backed editor restricted by `guard`.
    pub fn new(guard: PathGuard) -> Self {
        Self::with_store(FsStore::new(guard))
    }
}

impl<S: SourceStore> Editor<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            locks: FileLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List every top-level declaration in a file.
    pub fn list(&self, path: &Path, language: Option<&str>) -> Result<ListResponse, EditError> {
        let analyzer = analyzer_for(path, language)?;
        let source = self.store.read(path)?;
        let facts = index_source(analyzer, path, &source)?;

        Ok(ListResponse {
            file_path: path.display().to_string(),
            language: analyzer.language_id().to_string(),
            package: facts.package.clone(),
            declarations: facts.declarations.iter().map(DeclarationSummary::from).collect(),
        })
    }

    /// Find one construct and return its span and text.
    pub fn locate(
        &self,
        path: &Path,
        language: Option<&str>,
        part_type: &str,
        part_name: &str,
    ) -> Result<LocateResponse, EditError> {
        let analyzer = analyzer_for(path, language)?;
        let cap = resolve_part_type(analyzer, part_type)?;

        log::debug!("locate {} '{}' in {}", cap.kind, part_name, path.display());
        let source = self.store.read(path)?;
        let facts = index_source(analyzer, path, &source)?;

        let mut response = LocateResponse {
            found: false,
            part_type: part_type.to_string(),
            part_name: part_name.to_string(),
            start_line: 0,
            end_line: 0,
            start_offset: 0,
            end_offset: 0,
            content: String::new(),
            file_path: path.display().to_string(),
        };

        if let Some(decl) = (cap.locate)(&facts, cap.kind, part_name) {
            let span = decl.span;
            response.found = true;
            response.start_line = span.start_line;
            response.end_line = span.end_line;
            response.start_offset = span.start_byte;
            response.end_offset = span.end_byte;
            response.content =
                String::from_utf8_lossy(&source[span.start_byte..span.end_byte]).into_owned();
        }

        Ok(response)
    }

    /// Replace one construct, committing only if the result still parses.
    ///
    /// On any error the file is left byte-for-byte unchanged.
    pub fn replace(&self, req: &ReplaceRequest) -> Result<ReplaceResponse, EditError> {
        let path = req.path.as_path();
        let analyzer = analyzer_for(path, req.language.as_deref())?;
        let cap = resolve_part_type(analyzer, &req.part_type)?;
        (cap.validate)(cap, &req.new_content)?;

        log::info!(
            "replace {} '{}' in {}",
            cap.kind,
            req.part_name,
            path.display()
        );

        let result = self
            .locks
            .with_lock(path, || self.replace_locked(analyzer, cap, req));

        match &result {
            Ok(resp) => log::info!("{}", resp.message),
            Err(e) => log::warn!("replace rejected for {}: {}", path.display(), e),
        }
        result
    }

    fn replace_locked(
        &self,
        analyzer: &dyn LanguageAnalyzer,
        cap: &PartCapability,
        req: &ReplaceRequest,
    ) -> Result<ReplaceResponse, EditError> {
        let path = req.path.as_path();
        let language = analyzer.language_id();

        let source = self.store.read(path)?;
        let facts = index_source(analyzer, path, &source)?;

        let decl = (cap.locate)(&facts, cap.kind, &req.part_name).ok_or_else(|| {
            EditError::NotFound {
                kind: cap.kind.to_string(),
                name: req.part_name.clone(),
            }
        })?;
        let span = decl.span;
        log::debug!(
            "located {} at bytes {}..{} (lines {}-{})",
            decl.qualified_name(),
            span.start_byte,
            span.end_byte,
            span.start_line,
            span.end_line
        );

        let candidate = splice(&source, &span, req.new_content.as_bytes());
        analyzer
            .index(path, &candidate)
            .map_err(|e| EditError::InvalidResult {
                language: language.to_string(),
                detail: e.to_string(),
            })?;

        let new_end_line = span.start_line + req.new_content.matches('\n').count();
        let message = if candidate == source {
            format!(
                "{} '{}' in {} already matches the replacement; file unchanged",
                cap.kind,
                req.part_name,
                path.display()
            )
        } else {
            self.store.write(path, &candidate)?;
            format!(
                "Successfully replaced {} '{}' in {} (lines {}-{} now {}-{})",
                cap.kind,
                req.part_name,
                path.display(),
                span.start_line,
                span.end_line,
                span.start_line,
                new_end_line
            )
        };

        Ok(ReplaceResponse {
            success: true,
            file_path: path.display().to_string(),
            language: language.to_string(),
            part_type: req.part_type.clone(),
            part_name: req.part_name.clone(),
            message,
        })
    }
}

/// Explicit grammar id wins; otherwise infer from the file extension.
fn analyzer_for(
    path: &Path,
    language: Option<&str>,
) -> Result<&'static dyn LanguageAnalyzer, EditError> {
    match language {
        Some(lang) if !lang.trim().is_empty() => resolve_language(lang),
        _ => {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            match get_analyzer(ext) {
                Some(analyzer) => resolve_language(analyzer.language_id()),
                None => resolve_language(if ext.is_empty() { "unknown" } else { ext }),
            }
        }
    }
}

fn index_source(
    analyzer: &dyn LanguageAnalyzer,
    path: &Path,
    source: &[u8],
) -> Result<FileFacts, EditError> {
    analyzer
        .index(path, source)
        .map_err(|e| EditError::InvalidSource {
            path: path.to_path_buf(),
            language: analyzer.language_id().to_string(),
            detail: e.to_string(),
        })
}
