//! Go language analyzer using tree-sitter.
//!
//! Indexes the top level of a Go file:
//! - Package clause and imports
//! - Constant, variable and type declarations (single or grouped)
//! - Function declarations and methods with their verbatim receiver type
//! - Leading doc comments for each of the above

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{
    first_syntax_error, Declaration, DeclarationKind, FileFacts, IndexError, LanguageAnalyzer,
    ParsedFile, Span,
};

/// Go language analyzer.
pub struct GoAnalyzer {
    language: Language,
}

impl GoAnalyzer {
    /// Create a new Go analyzer.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Classify one top-level node. Comments and stray tokens yield None.
    fn classify(&self, parsed: &ParsedFile, node: Node) -> Option<Declaration> {
        let (kind, members, receiver) = match node.kind() {
            "package_clause" => {
                let name = node
                    .named_children(&mut node.walk())
                    .find(|n| n.kind() == "package_identifier")
                    .map(|n| parsed.node_text(n).to_string())?;
                (DeclarationKind::Package, vec![name], None)
            }
            "import_declaration" => {
                (DeclarationKind::Import, self.import_paths(parsed, node), None)
            }
            "const_declaration" => (DeclarationKind::Const, self.spec_names(parsed, node), None),
            "var_declaration" => (DeclarationKind::Var, self.spec_names(parsed, node), None),
            "type_declaration" => (DeclarationKind::Type, self.spec_names(parsed, node), None),
            "function_declaration" => {
                let name = node.child_by_field_name("name")?;
                (
                    DeclarationKind::Function,
                    vec![parsed.node_text(name).to_string()],
                    None,
                )
            }
            "method_declaration" => {
                let name = node.child_by_field_name("name")?;
                (
                    DeclarationKind::Method,
                    vec![parsed.node_text(name).to_string()],
                    self.receiver_type(parsed, node),
                )
            }
            _ => return None,
        };

        let name = members.first().cloned().unwrap_or_default();
        Some(Declaration {
            name,
            kind,
            span: Span::from_node(node),
            receiver,
            members,
            grouped: !kind.is_callable() && is_grouped(node),
            has_leading_comment: has_leading_comment(node),
        })
    }

    /// Names declared by the specs of a const/var/type declaration.
    fn spec_names(&self, parsed: &ParsedFile, decl: Node) -> Vec<String> {
        let mut names = Vec::new();
        for spec in specs(decl) {
            let mut cursor = spec.walk();
            for name in spec.children_by_field_name("name", &mut cursor) {
                names.push(parsed.node_text(name).to_string());
            }
        }
        names
    }

    /// Unquoted import paths of an import declaration.
    fn import_paths(&self, parsed: &ParsedFile, decl: Node) -> Vec<String> {
        specs(decl)
            .into_iter()
            .filter_map(|spec| spec.child_by_field_name("path"))
            .map(|path| {
                parsed
                    .node_text(path)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string()
            })
            .collect()
    }

    /// The receiver's type text, e.g. `*Config` for `func (c *Config) ...`.
    fn receiver_type(&self, parsed: &ParsedFile, method: Node) -> Option<String> {
        let receiver = method.child_by_field_name("receiver")?;
        let param = receiver
            .named_children(&mut receiver.walk())
            .find(|n| n.kind() == "parameter_declaration")?;
        let ty = param.child_by_field_name("type")?;
        Some(parsed.node_text(ty).to_string())
    }
}

/// Spec nodes of a declaration, looking through `( ... )` list wrappers.
fn specs(decl: Node) -> Vec<Node> {
    let mut out = Vec::new();
    for child in decl.named_children(&mut decl.walk()) {
        if child.kind().ends_with("_spec_list") {
            out.extend(
                child
                    .named_children(&mut child.walk())
                    .filter(|n| is_spec(*n)),
            );
        } else if is_spec(child) {
            out.push(child);
        }
    }
    out
}

fn is_spec(node: Node) -> bool {
    node.kind().ends_with("_spec") || node.kind() == "type_alias"
}

/// `const (`, `var (`, `type (` and `import (` blocks.
fn is_grouped(decl: Node) -> bool {
    decl.children(&mut decl.walk())
        .any(|c| c.kind() == "(" || c.kind().ends_with("_spec_list"))
}

/// A comment that ends on the line above `node` and is not a trailing
/// comment of the preceding statement.
///
/// Named siblings only: statement terminators are anonymous `\n` tokens
/// that end on the following line.
fn has_leading_comment(node: Node) -> bool {
    let Some(prev) = node.prev_named_sibling() else {
        return false;
    };
    if prev.kind() != "comment" {
        return false;
    }
    if prev.end_position().row + 1 < node.start_position().row {
        return false;
    }
    match prev.prev_named_sibling() {
        Some(before) => before.end_position().row < prev.start_position().row,
        None => true,
    }
}

impl Default for GoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for GoAnalyzer {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Go source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> Result<FileFacts, IndexError> {
        let root = parsed.tree.root_node();
        if let Some(err) = first_syntax_error(root, &parsed.source) {
            return Err(err.into());
        }

        let mut facts = FileFacts::empty(&parsed.path, self.language_id());
        let mut seen_package = false;

        for node in root.children(&mut root.walk()) {
            if node.kind() == "comment" && !seen_package {
                facts.has_file_comment = true;
                continue;
            }
            if let Some(decl) = self.classify(parsed, node) {
                if decl.kind == DeclarationKind::Package {
                    seen_package = true;
                    facts.package = Some(decl.name.clone());
                }
                facts.declarations.push(decl);
            }
        }

        Ok(facts)
    }
}
