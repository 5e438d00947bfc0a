//! Where documents live relative to the repository root
//!
//! `src/x.ts` is stored at `<storage_dir>/src/x.ts.tome.yaml`; the root
//! document at `<storage_dir>/.tome.yaml`. The two functions here are exact
//! inverses.

use crate::document::normalize_source_path;

/// Default storage directory under the repository root
pub const DEFAULT_STORAGE_DIR: &str = ".tome";

/// Suffix appended to the source path of every stored document
pub const DOCUMENT_SUFFIX: &str = ".tome.yaml";

/// Storage location of the document for `source`, relative to the root
#[must_use]
pub fn document_path_from_source_path(storage_dir: &str, source: &str) -> String {
    format!(
        "{}/{}{DOCUMENT_SUFFIX}",
        storage_dir.trim_matches('/'),
        normalize_source_path(source)
    )
}

/// Source path described by the document stored at `document_path`.
///
/// Returns `None` for paths outside the storage directory or without the
/// document suffix.
#[must_use]
pub fn source_path_from_document_path(storage_dir: &str, document_path: &str) -> Option<String> {
    let document_path = document_path.replace('\\', "/");
    let rest = document_path
        .strip_prefix(storage_dir.trim_matches('/'))?
        .strip_prefix('/')?;
    rest.strip_suffix(DOCUMENT_SUFFIX).map(str::to_string)
}

/// Whether a directory entry name belongs to document storage rather than
/// to the source tree
#[must_use]
pub fn is_storage_entry(storage_dir: &str, name: &str) -> bool {
    let storage_dir = storage_dir.trim_matches('/');
    name == storage_dir || name.ends_with(DOCUMENT_SUFFIX)
}
