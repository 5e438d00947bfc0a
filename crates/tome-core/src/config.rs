//! Workspace configuration
//!
//! Read from `tome.toml` at the repository root. Every field is optional:
//!
//! ```toml
//! storage_dir = ".tome"
//! relationship_fields = ["dependsOn", "calls"]
//! contents_field = "contents"
//!
//! [matcher]
//! fuzzy_threshold = 0.8
//! suggestion_threshold = 0.5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tome_artifact::storage::DEFAULT_STORAGE_DIR;
use tome_artifact::DEPENDS_ON;
use tome_audit::{AuditConfig, DEFAULT_CONTENTS_FIELD};
use tome_match::MatcherConfig;

use crate::error::ConfigError;

/// Name of the configuration file at the repository root
pub const CONFIG_FILE: &str = "tome.toml";

/// Tome workspace configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomeConfig {
    /// Directory under the root holding documents
    pub storage_dir: String,
    /// Content fields holding relationship references
    pub relationship_fields: Vec<String>,
    /// Field on directory documents listing expected children
    pub contents_field: String,
    /// Matching thresholds
    pub matcher: MatcherConfig,
}

impl TomeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storage directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<String>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// With relationship fields
    #[inline]
    #[must_use]
    pub fn with_relationship_fields(mut self, fields: Vec<String>) -> Self {
        self.relationship_fields = fields;
        self
    }

    /// With matcher configuration
    #[inline]
    #[must_use]
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Parse configuration text.
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this schema or a
    /// value is out of range
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load `tome.toml` from `root`, falling back to defaults when absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path: PathBuf = root.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Context passed to validation and graph building
    #[must_use]
    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig::new()
            .with_storage_dir(self.storage_dir.clone())
            .with_relationship_fields(self.relationship_fields.clone())
            .with_contents_field(self.contents_field.clone())
    }

    fn check(&self) -> Result<(), ConfigError> {
        let storage = self.storage_dir.trim_matches('/');
        if storage.is_empty() || storage == "." || storage.split('/').any(|s| s == "..") {
            return Err(ConfigError::InvalidValue(format!(
                "storage_dir must be a directory below the root, got '{}'",
                self.storage_dir
            )));
        }
        for (name, value) in [
            ("fuzzy_threshold", self.matcher.fuzzy_threshold),
            ("suggestion_threshold", self.matcher.suggestion_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue(format!(
                    "matcher.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TomeConfig {
    fn default() -> Self {
        Self {
            storage_dir: DEFAULT_STORAGE_DIR.to_string(),
            relationship_fields: vec![DEPENDS_ON.to_string()],
            contents_field: DEFAULT_CONTENTS_FIELD.to_string(),
            matcher: MatcherConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_is_default() {
        let config = TomeConfig::from_toml_str("", Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config, TomeConfig::default());
    }

    #[test]
    fn partial_matcher_section_keeps_defaults() {
        let text = "relationship_fields = [\"dependsOn\", \"calls\"]\n[matcher]\nfuzzy_threshold = 0.9\n";
        let config = TomeConfig::from_toml_str(text, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.relationship_fields, vec!["dependsOn", "calls"]);
        assert!((config.matcher.fuzzy_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.matcher.max_suggestions, 3);
        assert_eq!(config.storage_dir, ".tome");
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = TomeConfig::from_toml_str("[matcher]\nfuzzy_threshold = 1.5\n", Path::new(CONFIG_FILE))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        let err = TomeConfig::from_toml_str("storage_dir = \"../x\"\n", Path::new(CONFIG_FILE))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn unknown_types_fail_to_parse() {
        let err = TomeConfig::from_toml_str("storage_dir = 3\n", Path::new(CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn audit_config_carries_conventions() {
        let config = TomeConfig::new().with_storage_dir("notes");
        let audit = config.audit_config();
        assert_eq!(audit.storage_dir, "notes");
        assert_eq!(audit.relationship_fields, vec!["dependsOn"]);
        assert_eq!(audit.contents_field, "contents");
    }
}
