use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::rename::CollisionPolicy;
use crate::utils::io;

/// Per-corpus settings file, looked up at the corpus root.
pub const SETTINGS_FILE: &str = ".retag.json";

/// Corpus settings, merged over built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// File extensions treated as markdown documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names skipped at any depth.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Glob patterns (relative to the root) for files to leave alone.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Build a tag index to narrow the scan.
    #[serde(default = "default_use_index")]
    pub use_index: bool,

    #[serde(default)]
    pub on_collision: CollisionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_dirs: default_skip_dirs(),
            exclude: Vec::new(),
            use_index: default_use_index(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_skip_dirs() -> Vec<String> {
    [".git", ".obsidian", ".trash", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_use_index() -> bool {
    true
}

impl Settings {
    pub fn is_document_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == name)
    }

    pub fn is_excluded(&self, relative: &str) -> bool {
        self.exclude
            .iter()
            .any(|pattern| glob_match::glob_match(pattern, relative))
    }
}

// =============================================================================
// Loading functions
// =============================================================================

/// Settings file inside a corpus root.
pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

/// Load settings for a corpus.
///
/// An explicit file must exist. Without one, `<root>/.retag.json` is used when
/// present and built-in defaults otherwise. Invalid JSON is an error in both
/// cases.
pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = settings_path(root);
            if !path.exists() {
                return Ok(Settings::default());
            }
            path
        }
    };

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    if settings.extensions.is_empty() {
        return Err(Error::config_invalid_value(
            "extensions",
            None,
            "at least one document extension is required",
        ));
    }

    log_status!("config", "Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load(dir.path(), None).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.use_index);
        assert_eq!(settings.on_collision, CollisionPolicy::Report);
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            settings_path(dir.path()),
            r#"{"extensions": ["md", "markdown"], "onCollision": "exclude", "exclude": ["templates/**"]}"#,
        )
        .unwrap();

        let settings = load(dir.path(), None).unwrap();
        assert!(settings.is_document_extension("MARKDOWN"));
        assert_eq!(settings.on_collision, CollisionPolicy::Exclude);
        assert!(settings.is_excluded("templates/daily.md"));
        assert!(!settings.is_excluded("notes/daily.md"));
        assert!(settings.is_skipped_dir(".obsidian"));
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(settings_path(dir.path()), "{ not json").unwrap();

        let err = load(dir.path(), None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(settings_path(dir.path()), r#"{"onCollision": "whatever"}"#).unwrap();

        assert!(load(dir.path(), None).is_err());
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempdir().unwrap();
        let err = load(dir.path(), Some(&dir.path().join("nope.json"))).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn empty_extension_list_is_invalid() {
        let dir = tempdir().unwrap();
        std::fs::write(settings_path(dir.path()), r#"{"extensions": []}"#).unwrap();

        let err = load(dir.path(), None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }
}
