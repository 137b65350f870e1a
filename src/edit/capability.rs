//! Part-type capability tables, keyed by grammar identifier and part type.
//!
//! Every part type a grammar supports maps to one entry holding the
//! declaration kind, the keyword a replacement must start with, and the
//! locator and validator used for it. An unsupported part type is simply a
//! table miss, detected before any file is read.

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;

use super::error::EditError;
use super::locate;
use crate::analysis::{
    get_analyzer_by_id, registered_languages, Declaration, DeclarationKind, FileFacts,
    LanguageAnalyzer,
};

/// Finds a declaration by the caller-supplied name.
pub type Locator =
    for<'a> fn(&'a FileFacts, DeclarationKind, &str) -> Option<&'a Declaration>;

/// Cheap structural check of replacement text before the full re-parse.
pub type Validator = fn(&PartCapability, &str) -> Result<(), EditError>;

/// One supported part type of a grammar.
pub struct PartCapability {
    pub kind: DeclarationKind,
    /// Keyword that introduces the construct.
    pub keyword: &'static str,
    pub locate: Locator,
    pub validate: Validator,
}

/// Part types accepted for Go, including spelling aliases.
static GO_PARTS: phf::Map<&'static str, PartCapability> = phf_map! {
    "package" => PartCapability {
        kind: DeclarationKind::Package,
        keyword: "package",
        locate: locate::by_member,
        validate: starts_with_keyword,
    },
    "import" => PartCapability {
        kind: DeclarationKind::Import,
        keyword: "import",
        locate: locate::by_member,
        validate: starts_with_keyword,
    },
    "const" => PartCapability {
        kind: DeclarationKind::Const,
        keyword: "const",
        locate: locate::by_member,
        validate: starts_with_keyword,
    },
    "var" => PartCapability {
        kind: DeclarationKind::Var,
        keyword: "var",
        locate: locate::by_member,
        validate: starts_with_keyword,
    },
    "type" => PartCapability {
        kind: DeclarationKind::Type,
        keyword: "type",
        locate: locate::by_member,
        validate: starts_with_keyword,
    },
    "function" => PartCapability {
        kind: DeclarationKind::Function,
        keyword: "func",
        locate: locate::function,
        validate: starts_with_keyword,
    },
    "func" => PartCapability {
        kind: DeclarationKind::Function,
        keyword: "func",
        locate: locate::function,
        validate: starts_with_keyword,
    },
    "method" => PartCapability {
        kind: DeclarationKind::Method,
        keyword: "func",
        locate: locate::method,
        validate: declares_receiver,
    },
};

/// Canonical Go part types, in the order they are listed to callers.
const GO_PART_TYPES: &[&str] = &["package", "import", "const", "var", "type", "function", "method"];

/// A grammar's capability table and its canonical part types in listing order.
type PartTable = (
    &'static phf::Map<&'static str, PartCapability>,
    &'static [&'static str],
);

fn table_for(language_id: &str) -> Option<PartTable> {
    match language_id {
        "go" => Some((&GO_PARTS, GO_PART_TYPES)),
        _ => None,
    }
}

/// Resolve a grammar identifier to its analyzer.
pub fn resolve_language(language: &str) -> Result<&'static dyn LanguageAnalyzer, EditError> {
    let key = language.trim().to_lowercase();
    get_analyzer_by_id(&key)
        .filter(|a| table_for(a.language_id()).is_some())
        .ok_or_else(|| EditError::UnsupportedLanguage {
            language: language.to_string(),
            supported: registered_languages(),
        })
}

/// Look up the capability entry for a part type.
pub fn resolve_part_type(
    analyzer: &dyn LanguageAnalyzer,
    part_type: &str,
) -> Result<&'static PartCapability, EditError> {
    let language = analyzer.language_id();
    let unsupported = |valid: &[&str]| EditError::UnsupportedPartType {
        part_type: part_type.to_string(),
        language: language.to_string(),
        valid: valid.iter().map(|s| s.to_string()).collect(),
    };

    let Some((table, listed)) = table_for(language) else {
        return Err(unsupported(&[]));
    };
    table
        .get(part_type.trim().to_lowercase().as_str())
        .ok_or_else(|| unsupported(listed))
}

/// Canonical part types for a grammar (empty when unknown).
pub fn part_types(language_id: &str) -> &'static [&'static str] {
    table_for(language_id).map(|(_, listed)| listed).unwrap_or(&[])
}

/// `keyword` followed by whitespace or `(`, after leading whitespace.
fn has_keyword(text: &str, keyword: &str) -> bool {
    match text.trim_start().strip_prefix(keyword) {
        Some(rest) => rest.starts_with(|c: char| c.is_whitespace() || c == '('),
        None => false,
    }
}

fn starts_with_keyword(cap: &PartCapability, text: &str) -> Result<(), EditError> {
    if has_keyword(text, cap.keyword) {
        Ok(())
    } else {
        Err(EditError::MalformedReplacement {
            kind: cap.kind.to_string(),
            keyword: cap.keyword.to_string(),
        })
    }
}

/// `func (recv Type) Name(...)`
static RECEIVER_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^func\s*\([^)]*\)\s*[\p{L}_][\p{L}\p{N}_]*").expect("receiver pattern is valid")
});

fn declares_receiver(cap: &PartCapability, text: &str) -> Result<(), EditError> {
    starts_with_keyword(cap, text)?;
    if RECEIVER_CLAUSE.is_match(text.trim_start()) {
        Ok(())
    } else {
        Err(EditError::MissingReceiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go() -> &'static dyn LanguageAnalyzer {
        resolve_language("go").unwrap()
    }

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language("Go").unwrap().language_id(), "go");
        let err = resolve_language("cobol").err().unwrap();
        assert!(matches!(err, EditError::UnsupportedLanguage { .. }));
        assert!(err.to_string().contains("[go]"));
    }

    #[test]
    fn test_resolve_part_type_aliases() {
        assert_eq!(resolve_part_type(go(), "func").unwrap().kind, DeclarationKind::Function);
        assert_eq!(resolve_part_type(go(), "Function").unwrap().kind, DeclarationKind::Function);
        assert_eq!(resolve_part_type(go(), "method").unwrap().kind, DeclarationKind::Method);
    }

    #[test]
    fn test_unsupported_part_type_lists_valid_types() {
        let err = resolve_part_type(go(), "class").err().unwrap();
        assert_eq!(
            err.to_string(),
            "part_type 'class' not supported for language 'go'. Valid types: \
             [package, import, const, var, type, function, method]"
        );
    }

    #[test]
    fn test_every_listed_part_type_resolves() {
        for part in part_types("go") {
            assert!(resolve_part_type(go(), part).is_ok(), "{}", part);
        }
        assert!(part_types("cobol").is_empty());
    }

    #[test]
    fn test_keyword_validation() {
        let func = resolve_part_type(go(), "function").unwrap();
        assert!((func.validate)(func, "func Foo() {}").is_ok());
        assert!((func.validate)(func, "\n  func (c *C) Foo() {}").is_ok());

        let err = (func.validate)(func, "fn foo() {}").unwrap_err();
        assert_eq!(err.to_string(), "function replacement must start with 'func'");
        assert!((func.validate)(func, "function Foo() {}").is_err());
        assert!((func.validate)(func, "").is_err());

        let ty = resolve_part_type(go(), "type").unwrap();
        assert!((ty.validate)(ty, "type T struct{}").is_ok());
        assert!((ty.validate)(ty, "type (\n\tA int\n)").is_ok());
        assert!((ty.validate)(ty, "struct T {}").is_err());
    }

    #[test]
    fn test_method_requires_receiver() {
        let method = resolve_part_type(go(), "method").unwrap();
        let with_receiver = "func (c *Config) Validate() error { return nil }";
        assert!((method.validate)(method, with_receiver).is_ok());
        assert!(matches!(
            (method.validate)(method, "func Validate() error { return nil }"),
            Err(EditError::MissingReceiver)
        ));
    }
}
