//! Syntax error detection shared by every tree-sitter grammar.

use thiserror::Error;

/// First syntax error found in a parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
    /// What the parser found there, e.g. `missing ')'` or `unexpected '}'`.
    pub message: String,
}

/// Failure to build a declaration index.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("parser failure: {0}")]
    Parser(String),
}

/// Longest token excerpt quoted in an error message.
const EXCERPT_LIMIT: usize = 40;

/// Find the first ERROR or MISSING node in document order.
pub fn first_syntax_error(root: tree_sitter::Node, source: &[u8]) -> Option<SyntaxError> {
    if !root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();

        if node.is_missing() {
            let pos = node.start_position();
            return Some(SyntaxError {
                line: pos.row + 1,
                column: pos.column + 1,
                message: format!("missing '{}'", node.kind()),
            });
        }

        if node.is_error() {
            let pos = node.start_position();
            return Some(SyntaxError {
                line: pos.row + 1,
                column: pos.column + 1,
                message: format!("unexpected '{}'", excerpt(node, source)),
            });
        }

        // Only descend into subtrees that contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                // has_error() was true at the root but nothing was flagged below
                let pos = root.start_position();
                return Some(SyntaxError {
                    line: pos.row + 1,
                    column: pos.column + 1,
                    message: "syntax error".to_string(),
                });
            }
        }
    }
}

/// First line of a node's text, shortened for messages.
fn excerpt(node: tree_sitter::Node, source: &[u8]) -> String {
    let text = node.utf8_text(source).unwrap_or("");
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > EXCERPT_LIMIT {
        let cut: String = line.chars().take(EXCERPT_LIMIT).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_clean_source_has_no_error() {
        let source = "package main\n\nfunc main() {}\n";
        let tree = parse(source);
        assert!(first_syntax_error(tree.root_node(), source.as_bytes()).is_none());
    }

    #[test]
    fn test_reports_error_location() {
        let source = "package main\n\nfunc main() {\n\tx := \n}\n\nfunc broken( {\n";
        let tree = parse(source);
        let err = first_syntax_error(tree.root_node(), source.as_bytes())
            .expect("broken source should report an error");
        assert!(err.line >= 3, "unexpected line: {}", err);
        assert!(!err.message.is_empty());
    }
}
