//! Dot-separated paths into a document's content tree
//!
//! Provides [`DocPath`] for addressing mappings and sequences inside a
//! document. `""` and `"."` both address the whole content.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Top-level key reserved for document metadata
pub const META_KEY: &str = "meta";

/// Path within a document's content tree
///
/// # Examples
/// - `summary` → a top-level mapping key
/// - `exports.0.name` → key `name` of the first element of `exports`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path addresses the whole content
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get first segment (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Whether the path reaches into document metadata
    #[inline]
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.first() == Some(META_KEY)
    }

    /// Dotted form of the first `len` segments, used to name where a
    /// traversal went wrong
    #[must_use]
    pub fn prefix(&self, len: usize) -> String {
        self.0[..len.min(self.0.len())].join(".")
    }
}

/// Interpret a segment as a sequence index.
///
/// Digit-only segments that overflow `usize` saturate, which the mutator
/// treats as "append".
#[must_use]
pub fn segment_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.parse().unwrap_or(usize::MAX))
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl Default for DocPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to document paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Source path that is absolute or climbs out with `..`
    #[error("source path '{0}' is outside the repository root")]
    OutsideRoot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_dot_are_root() {
        assert!("".parse::<DocPath>().unwrap().is_root());
        assert!(".".parse::<DocPath>().unwrap().is_root());
        assert_eq!(DocPath::root().to_string(), ".");
    }

    #[test]
    fn parses_segments() {
        let path: DocPath = "exports.0.name".parse().unwrap();
        assert_eq!(path.segments(), &["exports", "0", "name"]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.to_string(), "exports.0.name");
    }

    #[test]
    fn keys_may_contain_dashes() {
        let path: DocPath = "side-effects.io".parse().unwrap();
        assert_eq!(path.first(), Some("side-effects"));
    }

    #[test]
    fn empty_segment_rejected() {
        let result: Result<DocPath, _> = "a..b".parse();
        assert!(matches!(result, Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn meta_paths_are_protected() {
        assert!("meta".parse::<DocPath>().unwrap().is_protected());
        assert!("meta.id".parse::<DocPath>().unwrap().is_protected());
        assert!(!"metadata".parse::<DocPath>().unwrap().is_protected());
        assert!(!DocPath::root().is_protected());
    }

    #[test]
    fn prefix_names_leading_segments() {
        let path: DocPath = "a.b.c".parse().unwrap();
        assert_eq!(path.prefix(2), "a.b");
        assert_eq!(path.prefix(9), "a.b.c");
    }

    #[test]
    fn segment_index_detection() {
        assert_eq!(segment_index("0"), Some(0));
        assert_eq!(segment_index("12"), Some(12));
        assert_eq!(segment_index("-1"), None);
        assert_eq!(segment_index("1a"), None);
        assert_eq!(segment_index(""), None);
        assert_eq!(segment_index("99999999999999999999999"), Some(usize::MAX));
    }
}
