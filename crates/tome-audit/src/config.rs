//! Audit context

use serde::{Deserialize, Serialize};
use tome_artifact::storage::DEFAULT_STORAGE_DIR;
use tome_artifact::DEPENDS_ON;

/// Default field on directory documents listing expected children
pub const DEFAULT_CONTENTS_FIELD: &str = "contents";

/// Workspace conventions the auditor needs to interpret documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Directory holding documents; excluded from directory listings
    pub storage_dir: String,
    /// Content fields holding relationship references
    pub relationship_fields: Vec<String>,
    /// Field on directory documents listing expected child names
    pub contents_field: String,
}

impl AuditConfig {
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

    /// With contents field
    #[inline]
    #[must_use]
    pub fn with_contents_field(mut self, field: impl Into<String>) -> Self {
        self.contents_field = field.into();
        self
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            storage_dir: DEFAULT_STORAGE_DIR.to_string(),
            relationship_fields: vec![DEPENDS_ON.to_string()],
            contents_field: DEFAULT_CONTENTS_FIELD.to_string(),
        }
    }
}
