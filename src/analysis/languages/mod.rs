//! Language-specific analyzer implementations.

mod go;

pub use go::GoAnalyzer;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;

/// Static storage for Go analyzer.
static GO_ANALYZER: OnceCell<GoAnalyzer> = OnceCell::new();

/// Register all available language analyzers.
///
/// Idempotent; lookups call it on demand.
pub fn register_analyzers() {
    GO_ANALYZER.get_or_init(GoAnalyzer::new);
}

/// Get an analyzer for the given file extension (without dot).
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    GO_ANALYZER
        .get()
        .filter(|a| a.handles_extension(ext))
        .map(|a| a as &'static dyn LanguageAnalyzer)
}

/// Get an analyzer by language ID.
pub fn get_analyzer_by_id(lang_id: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    match lang_id {
        "go" | "golang" => GO_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        _ => None,
    }
}

/// Get all registered language IDs.
pub fn registered_languages() -> Vec<String> {
    vec!["go".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_extension_and_id() {
        assert_eq!(get_analyzer("go").unwrap().language_id(), "go");
        assert_eq!(get_analyzer_by_id("golang").unwrap().language_id(), "go");
        assert!(get_analyzer("rs").is_none());
        assert!(get_analyzer_by_id("python").is_none());
    }
}
