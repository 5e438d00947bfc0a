//! Understanding documents
//!
//! A [`Document`] is the persisted note for one source file, one source
//! directory, or the repository root. It pairs protected [`Meta`] with a
//! free-form content tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hash::ContentHash;
use crate::path::PathError;

/// Version tag written into every document's metadata
pub const FORMAT_VERSION: &str = "tome/1";

/// Prefix of every document id; the remainder is the source path
pub const ID_PREFIX: &str = "tome:";

/// Dot-named entries that are conventionally directories
const DOT_DIRECTORIES: &[&str] = &[
    ".git",
    ".github",
    ".gitlab",
    ".vscode",
    ".idea",
    ".husky",
    ".circleci",
    ".devcontainer",
    ".cargo",
    ".config",
    ".changeset",
    ".storybook",
    ".yarn",
];

/// What a document describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// A single source file
    File,
    /// A source directory
    Directory,
    /// The repository root
    Repository,
}

impl DocType {
    /// Lowercase name as written in metadata
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Repository => "repository",
        }
    }
}

/// Protected document metadata
///
/// Never reachable through the path API; regenerated from the current
/// source on every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Format version tag
    pub version: String,
    /// Stable id derived from the source path
    pub id: String,
    /// Kind of source this document describes
    #[serde(rename = "type")]
    pub doc_type: DocType,
    /// When the document was last written
    pub analyzed_at: DateTime<Utc>,
    /// Hash of the source content at the last write (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_hash: Option<ContentHash>,
}

impl Meta {
    /// Source path encoded in the id
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        self.id.strip_prefix(ID_PREFIX)
    }
}

/// Stable document id for a source path
#[must_use]
pub fn document_id(path: &str) -> String {
    format!("{ID_PREFIX}{}", normalize_source_path(path))
}

/// Build fresh metadata for `path`.
///
/// `source` is the current content of the described file; directories and
/// the repository root pass `None` and carry no hash.
#[must_use]
pub fn generate_meta(path: &str, doc_type: DocType, source: Option<&[u8]>) -> Meta {
    Meta {
        version: FORMAT_VERSION.to_string(),
        id: document_id(path),
        doc_type,
        analyzed_at: Utc::now(),
        analyzed_hash: source.map(ContentHash::compute),
    }
}

/// Canonical source-relative form: forward slashes, no `./` prefix, no
/// trailing slash, root as `""`.
#[must_use]
pub fn normalize_source_path(path: &str) -> String {
    let mut p = path.trim().replace('\\', "/");
    while let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    let p = p.trim_end_matches('/');
    if p == "." {
        String::new()
    } else {
        p.to_string()
    }
}

/// [`normalize_source_path`], rejecting paths that resolve outside the
/// repository root.
///
/// # Errors
/// Returns [`PathError::OutsideRoot`] for absolute paths, drive-prefixed
/// paths and paths with a `..` segment
pub fn check_source_path(path: &str) -> Result<String, PathError> {
    let raw = path.trim().replace('\\', "/");
    let drive = raw.as_bytes().get(1) == Some(&b':')
        && raw.as_bytes().first().is_some_and(u8::is_ascii_alphabetic);
    let normalized = normalize_source_path(path);
    if raw.starts_with('/') || drive || normalized.split('/').any(|seg| seg == "..") {
        return Err(PathError::OutsideRoot(path.to_string()));
    }
    Ok(normalized)
}

/// Guess the document type of a source path from its shape alone.
#[must_use]
pub fn detect_type(path: &str) -> DocType {
    let path = normalize_source_path(path);
    if path.is_empty() {
        return DocType::Repository;
    }
    let name = path.rsplit('/').next().unwrap_or(&path);

    if name.starts_with('.') {
        return if DOT_DIRECTORIES.contains(&name) {
            DocType::Directory
        } else {
            DocType::File
        };
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => DocType::File,
        _ => DocType::Directory,
    }
}

/// A persisted understanding document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) path: String,
    pub(crate) meta: Meta,
    pub(crate) content: Map<String, Value>,
}

impl Document {
    /// Create an empty document for `path` with the given metadata
    #[must_use]
    pub fn new(path: &str, meta: Meta) -> Self {
        Self {
            path: normalize_source_path(path),
            meta,
            content: Map::new(),
        }
    }

    /// Create a document with initial content
    #[must_use]
    pub fn with_content(path: &str, meta: Meta, content: Map<String, Value>) -> Self {
        Self {
            content,
            ..Self::new(path, meta)
        }
    }

    /// Source-relative path (`""` for the repository root)
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Protected metadata
    #[inline]
    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Stable document id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    /// Document type
    #[inline]
    #[must_use]
    pub fn doc_type(&self) -> DocType {
        self.meta.doc_type
    }

    /// Free-form content tree
    #[inline]
    #[must_use]
    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    /// Copy of this document carrying new metadata and unchanged content
    #[must_use]
    pub fn with_meta(&self, meta: Meta) -> Self {
        Self {
            meta,
            ..self.clone()
        }
    }
}
