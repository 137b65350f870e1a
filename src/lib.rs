//! Structedit - structural source analysis and mutation for tool callers.
//!
//! Structedit parses a source file into its top-level declarations, finds
//! one by kind and name, and replaces it with new text only if the edited
//! file still parses. Over a whole tree it reports undocumented
//! declarations, sorted by priority and paged to fit a response budget.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis:
//!
//! - `analysis`: declaration indexing with per-language analyzers
//! - `edit`: locate, list and replace single declarations
//! - `conformance`: documentation scanning, prioritizing and sizing
//! - `config`: YAML configuration
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement `LanguageAnalyzer`
//! trait, register it in `languages/mod.rs` and give it a part-type table
//! in `edit/capability.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod conformance;
pub mod edit;
pub mod report;

pub use analysis::{
    register_analyzers, Declaration, DeclarationKind, FileFacts, GoAnalyzer, LanguageAnalyzer,
    Span,
};
pub use config::Config;
pub use conformance::{ConformanceIssue, IssueReport, IssueType, ScanOptions};
pub use edit::{EditError, Editor, PathGuard, ReplaceRequest};
