//! Documents on disk
//!
//! One YAML file per document under `<root>/<storage_dir>`, at the location
//! given by [`document_path_from_source_path`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tome_artifact::codec;
use tome_artifact::storage::{
    document_path_from_source_path, source_path_from_document_path, DOCUMENT_SUFFIX,
};
use tome_artifact::Document;
use tome_audit::{DiscoveredDocument, ScanError};
use walkdir::WalkDir;

use crate::error::{StoreError, TomeError};

/// Reads and writes documents under a storage directory
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    storage_dir: String,
}

impl DocumentStore {
    /// Store for the repository at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, storage_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            storage_dir: storage_dir.into(),
        }
    }

    /// Repository root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the document for `source`
    #[must_use]
    pub fn document_path(&self, source: &str) -> PathBuf {
        self.root
            .join(document_path_from_source_path(&self.storage_dir, source))
    }

    /// Whether a document exists for `source`
    #[must_use]
    pub fn exists(&self, source: &str) -> bool {
        self.document_path(source).is_file()
    }

    /// Stored text of the document for `source`, if any.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read
    pub fn read_text(&self, source: &str) -> Result<Option<String>, StoreError> {
        let path = self.document_path(source);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// The document for `source`, if any.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded
    pub fn load(&self, source: &str) -> Result<Option<Document>, TomeError> {
        match self.read_text(source)? {
            Some(text) => Ok(Some(codec::from_yaml(&text)?)),
            None => Ok(None),
        }
    }

    /// Write already-serialized document text for `source`.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be written
    pub fn write_text(&self, source: &str, text: &str) -> Result<PathBuf, StoreError> {
        let path = self.document_path(source);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, text).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "document written");
        Ok(path)
    }

    /// Serialize and write `doc`.
    ///
    /// # Errors
    /// Returns error if encoding or writing fails
    pub fn save(&self, doc: &Document) -> Result<PathBuf, TomeError> {
        let text = codec::to_yaml(doc)?;
        Ok(self.write_text(doc.path(), &text)?)
    }

    /// Every stored document, sorted by location.
    ///
    /// Files that cannot be read or decoded come back as failed discoveries
    /// rather than errors. A missing storage directory yields nothing.
    #[must_use]
    pub fn discover(&self) -> Vec<DiscoveredDocument> {
        let storage = self.root.join(self.storage_dir.trim_matches('/'));
        if !storage.is_dir() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&storage).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let location = err
                        .path()
                        .map(|p| self.relative(p))
                        .unwrap_or_else(|| self.storage_dir.clone());
                    found.push(DiscoveredDocument::failed(ScanError::Io {
                        path: location,
                        source: err.into(),
                    }));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let location = self.relative(entry.path());
            if !location.ends_with(DOCUMENT_SUFFIX) {
                continue;
            }
            found.push(self.read_discovered(entry.path(), location));
        }

        tracing::debug!(documents = found.len(), "discovery complete");
        found
    }

    fn read_discovered(&self, path: &Path, location: String) -> DiscoveredDocument {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                return DiscoveredDocument::failed(ScanError::Io {
                    path: location,
                    source,
                })
            }
        };
        match codec::from_yaml(&text) {
            Ok(doc) => {
                let expected = source_path_from_document_path(&self.storage_dir, &location);
                if expected.as_deref() != Some(doc.path()) {
                    tracing::warn!(
                        location = %location,
                        id = doc.id(),
                        "document id does not match its location"
                    );
                }
                DiscoveredDocument::parsed(location, doc)
            }
            Err(source) => DiscoveredDocument::failed(ScanError::Decode {
                path: location,
                source,
            }),
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use tome_artifact::{detect_type, generate_meta, set_by_path};

    fn store() -> (TempDir, DocumentStore) {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path(), ".tome");
        (dir, store)
    }

    fn doc(path: &str) -> Document {
        let doc = Document::new(path, generate_meta(path, detect_type(path), Some(b"src")));
        set_by_path(&doc, "summary", json!("s")).unwrap()
    }

    #[test]
    fn save_then_load() {
        let (_dir, store) = store();
        let original = doc("src/x.ts");
        let path = store.save(&original).unwrap();
        assert!(path.ends_with(".tome/src/x.ts.tome.yaml"));
        assert_eq!(store.load("src/x.ts").unwrap(), Some(original));
        assert_eq!(store.load("src/y.ts").unwrap(), None);
    }

    #[test]
    fn discover_reports_undecodable_documents() {
        let (dir, store) = store();
        store.save(&doc("a.ts")).unwrap();
        store.save(&doc("")).unwrap();
        fs::write(dir.path().join(".tome/broken.ts.tome.yaml"), "- not a mapping").unwrap();
        fs::write(dir.path().join(".tome/notes.txt"), "ignored").unwrap();

        let found = store.discover();
        let locations: Vec<&str> = found.iter().map(|d| d.location.as_str()).collect();
        assert_eq!(
            locations,
            vec![".tome/.tome.yaml", ".tome/a.ts.tome.yaml", ".tome/broken.ts.tome.yaml"]
        );
        assert!(found[0].document().is_some());
        assert!(matches!(found[2].document, Err(ScanError::Decode { .. })));
    }

    #[test]
    fn discover_without_storage_is_empty() {
        let (_dir, store) = store();
        assert!(store.discover().is_empty());
    }
}
