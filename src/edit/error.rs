//! Error taxonomy for structural edits.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a locate or replace request.
///
/// Display strings are returned verbatim to tool callers.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("language '{language}' not supported. Supported languages: [{}]", .supported.join(", "))]
    UnsupportedLanguage {
        language: String,
        supported: Vec<String>,
    },

    #[error("part_type '{part_type}' not supported for language '{language}'. Valid types: [{}]", .valid.join(", "))]
    UnsupportedPartType {
        part_type: String,
        language: String,
        valid: Vec<String>,
    },

    #[error("{kind} '{name}' not found in file")]
    NotFound { kind: String, name: String },

    #[error("{kind} replacement must start with '{keyword}'")]
    MalformedReplacement { kind: String, keyword: String },

    #[error("method replacement must declare a receiver: 'func (r Type) Name(...)'")]
    MissingReceiver,

    #[error("file {path} is not valid {language} source: {detail}")]
    InvalidSource {
        path: PathBuf,
        language: String,
        detail: String,
    },

    #[error("replacement resulted in invalid {language} syntax: {detail}")]
    InvalidResult { language: String, detail: String },

    #[error("access denied: {} is outside the allowed paths", .0.display())]
    AccessDenied(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    /// Short machine-readable category.
    pub fn category(&self) -> &'static str {
        match self {
            EditError::UnsupportedLanguage { .. } | EditError::UnsupportedPartType { .. } => {
                "unsupported_capability"
            }
            EditError::NotFound { .. } => "not_found",
            EditError::MalformedReplacement { .. } | EditError::MissingReceiver => {
                "malformed_input"
            }
            EditError::InvalidSource { .. } => "invalid_source",
            EditError::InvalidResult { .. } => "post_mutation_invalid",
            EditError::AccessDenied(_) | EditError::Read { .. } | EditError::Write { .. } => {
                "storage_failure"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_verbatim() {
        let err = EditError::NotFound {
            kind: "function".to_string(),
            name: "Missing".to_string(),
        };
        assert_eq!(err.to_string(), "function 'Missing' not found in file");

        let err = EditError::UnsupportedPartType {
            part_type: "class".to_string(),
            language: "go".to_string(),
            valid: vec!["function".to_string(), "type".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "part_type 'class' not supported for language 'go'. Valid types: [function, type]"
        );

        let err = EditError::MalformedReplacement {
            kind: "type".to_string(),
            keyword: "type".to_string(),
        };
        assert_eq!(err.to_string(), "type replacement must start with 'type'");
        assert_eq!(err.category(), "malformed_input");
    }
}
