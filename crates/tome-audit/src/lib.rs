//! Tome Audit
//!
//! Keeps a document set honest against the source tree it describes.
//!
//! # Overview
//!
//! - [`validate`]: uncovered sources, orphaned and stale documents,
//!   directory contents mismatches, unresolvable references
//! - [`build_dependency_graph`]: forward and reverse reference index for
//!   change-impact queries
//! - [`SourceTree`]: the read-only view of sources both work from
//!
//! # Example
//!
//! ```rust
//! use tome_artifact::{detect_type, generate_meta, Document};
//! use tome_audit::{validate, AuditConfig, DiscoveredDocument, MemoryTree};
//!
//! let tree = MemoryTree::new().with_file("a.ts", "a").with_file("b.ts", "b");
//! let doc = Document::new("a.ts", generate_meta("a.ts", detect_type("a.ts"), Some(b"a")));
//! let found = vec![DiscoveredDocument::parsed("a.ts", doc)];
//!
//! let result = validate(&tree, &tree.file_paths(), &found, &AuditConfig::default());
//! assert_eq!(result.uncovered, vec!["b.ts"]);
//! assert!(result.stale.is_empty());
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod graph;
mod tree;
mod validate;

// Re-exports
pub use config::{AuditConfig, DEFAULT_CONTENTS_FIELD};
pub use error::ScanError;
pub use graph::{build_dependency_graph, find_dependents, DependencyGraph, GraphNode};
pub use tree::{FsTree, MemoryTree, SourceTree};
pub use validate::{
    get_issue_count, validate, ContentsIssue, DegradedEntry, DiscoveredDocument, StaleReference,
    ValidationResult,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
