//! Testing utilities for the Tome workspace
//!
//! Shared fixtures: documents, in-memory and on-disk repositories, a
//! configurable model parser, and opt-in log output.

#![allow(missing_docs)]

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::sync::Once;

use serde_json::Value;
use tempfile::TempDir;
use tome_artifact::storage::DEFAULT_STORAGE_DIR;
use tome_artifact::{detect_type, generate_meta, set_by_path, DocType, Document};
use tome_audit::{DiscoveredDocument, MemoryTree};
use tome_core::{
    Diagnostic, ModelParser, ParseReport, Severity, TomeConfig, Workspace, CONFIG_FILE,
};
use walkdir::WalkDir;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn file_document(path: &str, source: &str) -> Document {
    Document::new(path, generate_meta(path, DocType::File, Some(source.as_bytes())))
}

pub fn directory_document(path: &str) -> Document {
    Document::new(path, generate_meta(path, detect_type(path), None))
}

pub fn with_field(doc: &Document, path: &str, value: Value) -> Document {
    set_by_path(doc, path, value).unwrap()
}

pub fn discovered(docs: &[Document]) -> Vec<DiscoveredDocument> {
    docs.iter()
        .map(|d| DiscoveredDocument::parsed(d.path().to_string(), d.clone()))
        .collect()
}

pub fn memory_tree(files: &[(&str, &str)]) -> MemoryTree {
    files
        .iter()
        .fold(MemoryTree::new(), |tree, (path, content)| tree.with_file(path, *content))
}

/// A throwaway repository on disk
pub struct TempRepo {
    dir: TempDir,
}

impl TempRepo {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    pub fn remove(&self, path: &str) {
        fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    /// Source files, excluding document storage and the config file
    pub fn inventory(&self) -> Vec<String> {
        let root = self.dir.path();
        let mut files: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.file_name() != OsStr::new(DEFAULT_STORAGE_DIR))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .filter(|p| *p != CONFIG_FILE)
            .collect();
        files.sort();
        files
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::with_config(self.dir.path(), TomeConfig::default())
    }
}

impl Default for TempRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects any document whose text contains `marker`
#[derive(Debug, Clone)]
pub struct MarkerParser {
    pub marker: String,
}

impl MarkerParser {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
        }
    }
}

impl ModelParser for MarkerParser {
    fn check(&self, file: &str, text: &str) -> ParseReport {
        let Some((line, content)) = text
            .lines()
            .enumerate()
            .find(|(_, l)| l.contains(&self.marker))
        else {
            return ParseReport::ok();
        };
        let column = content.find(&self.marker).unwrap_or_default() + 1;
        ParseReport::failed(vec![Diagnostic {
            file: file.to_string(),
            line: line + 1,
            column,
            severity: Severity::Error,
            code: "E001".to_string(),
            message: format!("forbidden marker '{}'", self.marker),
        }])
    }
}
