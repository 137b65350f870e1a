//! Core traits for language analysis.

use std::path::Path;

use super::{FileFacts, IndexError};

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from FileFacts so the tree can be checked for syntax
/// errors and walked for declarations without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Language-specific declaration indexer.
///
/// Each grammar implements this trait once. The locator, mutator and
/// conformance scanner only ever see [`FileFacts`], so adding a grammar
/// means adding an analyzer here and a capability table in `edit`.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser
/// per call.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "go").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Only fails when the parser itself cannot run. Syntax errors are
    /// left in the tree as ERROR/MISSING nodes for `extract_facts` to reject.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Walk the top-level nodes once and build the declaration index.
    ///
    /// Fails on the first syntax error in the tree; no partial index is
    /// ever returned.
    fn extract_facts(&self, parsed: &ParsedFile) -> Result<FileFacts, IndexError>;

    /// Parse and index in one step.
    fn index(&self, path: &Path, source: &[u8]) -> Result<FileFacts, IndexError> {
        let parsed = self
            .parse(path, source)
            .map_err(|e| IndexError::Parser(e.to_string()))?;
        self.extract_facts(&parsed)
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
