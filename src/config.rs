//! Configuration for structedit.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file names looked up in the current directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["structedit.yaml", ".structedit.yaml"];

/// Default scan response budget, in characters.
pub const DEFAULT_RESPONSE_BUDGET: usize = 40_000;

fn default_response_budget() -> usize {
    DEFAULT_RESPONSE_BUDGET
}

fn default_skip_dirs() -> Vec<String> {
    ["vendor", "testdata", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_readme_names() -> Vec<String> {
    ["README", "README.md", "README.txt", "README.rst"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum serialized size of one scan response, in characters.
    #[serde(default = "default_response_budget")]
    pub response_budget: usize,
    /// Scan `_test.go` files too (default: false)
    pub include_test_files: bool,
    /// Only report declarations with exported names (default: false)
    pub exported_only: bool,
    /// Directory names never descended into. Hidden directories are always skipped.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    /// Glob patterns, relative to the scan root, for files to leave out (e.g. "**/gen/**")
    pub excluded_paths: Vec<String>,
    /// File names that count as a README, compared case-insensitively.
    #[serde(default = "default_readme_names")]
    pub readme_names: Vec<String>,
    /// Directory roots the editor may read and write. Empty allows everything.
    pub allowed_paths: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            response_budget: DEFAULT_RESPONSE_BUDGET,
            include_test_files: false,
            exported_only: false,
            skip_dirs: default_skip_dirs(),
            excluded_paths: Vec::new(),
            readme_names: default_readme_names(),
            allowed_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text. Blank text yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Find and load the configuration.
    ///
    /// Lookup order: the explicit path, then the names in
    /// [`DEFAULT_CONFIG_NAMES`] in the current directory, then `config.yaml`
    /// in the platform config directory. Falls back to the defaults.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::parse_file(path)
                .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
            return Ok((config, Some(path.to_path_buf())));
        }

        let candidates = DEFAULT_CONFIG_NAMES
            .iter()
            .map(PathBuf::from)
            .chain(user_config_path());

        for path in candidates {
            if path.is_file() {
                log::debug!("using config {}", path.display());
                let config = Self::parse_file(&path)
                    .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
                return Ok((config, Some(path)));
            }
        }

        log::debug!("no config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Compiled matcher for `excluded_paths`.
    pub fn excluded_matcher(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// `config.yaml` in the per-user config directory, if one can be determined.
fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "structedit")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.response_budget == 0 {
        anyhow::bail!("response_budget must be greater than zero");
    }

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    if config.readme_names.iter().any(|n| n.trim().is_empty()) {
        anyhow::bail!("readme_names must not contain empty names");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
response_budget: 2000
exported_only: true
excluded_paths:
  - "**/gen/**"
allowed_paths:
  - /srv/project
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.response_budget, 2000);
        assert!(config.exported_only);
        assert!(!config.include_test_files);
        assert_eq!(config.excluded_paths, vec!["**/gen/**"]);
        assert_eq!(config.allowed_paths, vec![PathBuf::from("/srv/project")]);
        // Unset lists keep their defaults
        assert!(config.skip_dirs.contains(&"vendor".to_string()));
        assert!(config.readme_names.contains(&"README.md".to_string()));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.response_budget, DEFAULT_RESPONSE_BUDGET);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            response_budget: 0,
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = Config {
            excluded_paths: vec!["[unclosed".to_string()],
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("invalid excluded_paths pattern"));
    }

    #[test]
    fn test_excluded_matcher() {
        let config = Config {
            excluded_paths: vec!["**/gen/**".to_string(), "*.pb.go".to_string()],
            ..Default::default()
        };
        let matcher = config.excluded_matcher().unwrap();
        assert!(matcher.is_match("api/gen/types.go"));
        assert!(matcher.is_match("service.pb.go"));
        assert!(!matcher.is_match("api/server.go"));
    }

    #[test]
    fn test_discover_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        fs::write(&path, "response_budget: 123\n").unwrap();

        let (config, found) = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.response_budget, 123);
        assert_eq!(found.as_deref(), Some(path.as_path()));

        assert!(Config::discover(Some(&temp.path().join("missing.yaml"))).is_err());
    }
}
