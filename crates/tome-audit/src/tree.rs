//! The source tree as seen by the auditor
//!
//! Paths are source-relative with forward slashes; `""` is the root.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tome_artifact::{check_source_path, normalize_source_path};

/// Read access to a source tree
///
/// Implementations must be shareable across threads; staleness hashing
/// reads sources in parallel.
pub trait SourceTree: Send + Sync {
    /// Whether a file or directory exists at `path`
    fn exists(&self, path: &str) -> bool;

    /// Content of the file at `path`
    ///
    /// # Errors
    /// Returns error if the file is missing or unreadable
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Names of the direct children of the directory at `path`, sorted
    ///
    /// # Errors
    /// Returns error if `path` is not a readable directory
    fn list_dir(&self, path: &str) -> io::Result<Vec<String>>;
}

/// A source tree on disk
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    /// Tree rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths outside the root resolve to an `InvalidInput` error.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let path = check_source_path(path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if path.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(path))
        }
    }
}

impl SourceTree for FsTree {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.exists())
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path)?)
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.resolve(path)?)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

/// An in-memory source tree
///
/// Directories are implied by the files under them.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryTree {
    /// Empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a file at `path`
    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or overwrite the file at `path`
    pub fn insert(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.insert(normalize_source_path(path), content.into());
    }

    /// Remove the file at `path`, returning its content
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(&normalize_source_path(path))
    }

    /// Every file path, sorted
    #[must_use]
    pub fn file_paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn is_dir(&self, path: &str) -> bool {
        path.is_empty() || self.files.keys().any(|f| is_under(f, path))
    }
}

fn is_under(file: &str, dir: &str) -> bool {
    dir.is_empty()
        || file
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such path: {path}"))
}

impl SourceTree for MemoryTree {
    fn exists(&self, path: &str) -> bool {
        let path = normalize_source_path(path);
        self.files.contains_key(&path) || self.is_dir(&path)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(&normalize_source_path(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let dir = normalize_source_path(path);
        if !self.is_dir(&dir) {
            return Err(not_found(path));
        }
        let prefix_len = if dir.is_empty() { 0 } else { dir.len() + 1 };
        let names: BTreeSet<String> = self
            .files
            .keys()
            .filter(|f| is_under(f, &dir))
            .filter_map(|f| f[prefix_len..].split('/').next())
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MemoryTree {
        MemoryTree::new()
            .with_file("src/a.ts", "a")
            .with_file("src/lib/b.ts", "b")
            .with_file("README.md", "readme")
    }

    #[test]
    fn memory_tree_implies_directories() {
        let tree = tree();
        assert!(tree.exists(""));
        assert!(tree.exists("src"));
        assert!(tree.exists("src/lib"));
        assert!(tree.exists("./src/a.ts"));
        assert!(!tree.exists("sr"));
        assert!(!tree.exists("src/c.ts"));
    }

    #[test]
    fn memory_tree_lists_direct_children() {
        let tree = tree();
        assert_eq!(tree.list_dir("").unwrap(), vec!["README.md", "src"]);
        assert_eq!(tree.list_dir("src").unwrap(), vec!["a.ts", "lib"]);
        assert!(tree.list_dir("src/a.ts").is_err());
    }

    #[test]
    fn fs_tree_refuses_paths_outside_root() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("repo")).unwrap();
        fs::write(dir.path().join("secret.txt"), "s").unwrap();
        fs::write(dir.path().join("repo/a.ts"), "a").unwrap();

        let tree = FsTree::new(dir.path().join("repo"));
        assert_eq!(tree.read("a.ts").unwrap(), b"a");
        assert!(!tree.exists("../secret.txt"));
        assert_eq!(
            tree.read("../secret.txt").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(tree.list_dir("..").is_err());
    }

    #[test]
    fn memory_tree_read_and_remove() {
        let mut tree = tree();
        assert_eq!(tree.read("src/a.ts").unwrap(), b"a");
        assert_eq!(tree.remove("src/a.ts"), Some(b"a".to_vec()));
        assert_eq!(tree.read("src/a.ts").unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
