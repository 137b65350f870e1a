//! AST-backed declaration indexing.
//!
//! This module turns raw source text into [`FileFacts`]: the ordered list of
//! top-level declarations in a file, each with its kind, name, receiver and
//! exact byte/line span. Both the structural editor and the documentation
//! scanner consume it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source bytes    │────▶│ Analyzer     │────▶│ FileFacts     │
//! └─────────────────┘     │ (Go)         │     │ (Declarations,│
//!                         └──────────────┘     │  spans)       │
//!                                              └───────────────┘
//!                                                 │         │
//!                                                 ▼         ▼
//!                                          ┌──────────┐ ┌────────────┐
//!                                          │ edit     │ │conformance │
//!                                          └──────────┘ └────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement `LanguageAnalyzer`
//! 3. Register the analyzer in `languages/mod.rs`
//! 4. Add a part-type capability table in `src/edit/capability.rs`
//!
//! See `languages/go.rs` for a reference implementation.

mod facts;
mod languages;
mod syntax;
mod traits;

pub use facts::{Declaration, DeclarationKind, FileFacts, Span};
pub use languages::{
    get_analyzer, get_analyzer_by_id, register_analyzers, registered_languages, GoAnalyzer,
};
pub use syntax::{first_syntax_error, IndexError, SyntaxError};
pub use traits::{LanguageAnalyzer, ParsedFile};
