//! Fact structures extracted from a single parse pass.

use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Whether the span covers more than one line.
    pub fn is_multi_line(&self) -> bool {
        self.end_line > self.start_line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind of top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Package,
    Import,
    Const,
    Var,
    Type,
    Function,
    Method,
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Package => "package",
            DeclarationKind::Import => "import",
            DeclarationKind::Const => "const",
            DeclarationKind::Var => "var",
            DeclarationKind::Type => "type",
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
        }
    }

    /// Check if this is a callable (function or method).
    pub fn is_callable(&self) -> bool {
        matches!(self, DeclarationKind::Function | DeclarationKind::Method)
    }

    /// Kinds that must carry a doc comment.
    pub fn is_documentable(&self) -> bool {
        !matches!(self, DeclarationKind::Package | DeclarationKind::Import)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A top-level declaration extracted from source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The declaration name. For multi-name statements this is the first name.
    pub name: String,
    /// The kind of declaration.
    pub kind: DeclarationKind,
    /// Source span for the entire declaration statement.
    pub span: Span,
    /// For methods: the receiver type, verbatim (e.g. `*Config`).
    pub receiver: Option<String>,
    /// Every name the statement declares, in source order.
    pub members: Vec<String>,
    /// Parenthesized block (`const ( ... )`, `var ( ... )`, ...).
    pub grouped: bool,
    /// A comment sits directly above the declaration on its own line(s).
    pub has_leading_comment: bool,
}

impl Declaration {
    /// Get the externally visible name (`Receiver.Name` for methods).
    pub fn qualified_name(&self) -> String {
        if let Some(ref recv) = self.receiver {
            format!("{}.{}", recv, self.name)
        } else {
            self.name.clone()
        }
    }

    /// Whether the statement declares `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.name == name || self.members.iter().any(|m| m == name)
    }

    /// Receiver type with any pointer marker removed.
    pub fn receiver_base(&self) -> Option<&str> {
        self.receiver.as_deref().map(|r| r.trim_start_matches('*'))
    }
}

/// All facts extracted from a single file.
#[derive(Debug, Clone)]
pub struct FileFacts {
    /// File path.
    pub path: String,
    /// Language identifier.
    pub language: String,
    /// Package/module name (if applicable).
    pub package: Option<String>,
    /// All top-level declarations, in source order.
    pub declarations: Vec<Declaration>,
    /// A comment precedes the package clause.
    pub has_file_comment: bool,
}

impl FileFacts {
    /// Create empty facts for a file.
    pub fn empty(path: &str, language: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            package: None,
            declarations: Vec::new(),
            has_file_comment: false,
        }
    }

    /// Find declarations by kind.
    pub fn declarations_by_kind(
        &self,
        kind: DeclarationKind,
    ) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span {
            start_byte: start,
            end_byte: end,
            start_line: 1,
            start_col: 1,
            end_line: 1,
            end_col: end - start + 1,
        }
    }

    fn decl(name: &str, kind: DeclarationKind, receiver: Option<&str>) -> Declaration {
        Declaration {
            name: name.to_string(),
            kind,
            span: span(0, 10),
            receiver: receiver.map(str::to_string),
            members: vec![name.to_string()],
            grouped: false,
            has_leading_comment: false,
        }
    }

    #[test]
    fn test_declaration_qualified_name() {
        let func = decl("main", DeclarationKind::Function, None);
        assert_eq!(func.qualified_name(), "main");

        let method = decl("Validate", DeclarationKind::Method, Some("*Config"));
        assert_eq!(method.qualified_name(), "*Config.Validate");
        assert_eq!(method.receiver_base(), Some("Config"));
    }

    #[test]
    fn test_declares_group_member() {
        let mut group = decl("MaxRetries", DeclarationKind::Const, None);
        group.members.push("Timeout".to_string());
        group.grouped = true;

        assert!(group.declares("MaxRetries"));
        assert!(group.declares("Timeout"));
        assert!(!group.declares("timeout"));
    }

    #[test]
    fn test_span_lines() {
        let mut s = span(0, 10);
        assert!(!s.is_multi_line());
        assert_eq!(s.to_string(), "1:1");
        s.end_line = 3;
        assert!(s.is_multi_line());
    }
}
