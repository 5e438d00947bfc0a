//! Tome Document Model
//!
//! Understanding documents with protected metadata and immutable,
//! path-addressed mutation.
//!
//! # Core Concepts
//!
//! - [`Document`]: one note per source file, directory or repository root
//! - [`Meta`]: protected metadata (`id`, `type`, `analyzed_at`, `analyzed_hash`)
//! - [`ContentHash`]: Blake3 fingerprint of source content
//! - [`DocPath`]: dot-separated addressing within document content
//! - [`set_by_path`] / [`delete_by_path`] / [`get_by_path`]: pure mutation API
//!
//! # Example
//!
//! ```rust
//! use tome_artifact::{detect_type, generate_meta, set_by_path, get_by_path, Document};
//! use serde_json::json;
//!
//! let path = "src/x.ts";
//! let meta = generate_meta(path, detect_type(path), Some(b"export const x = 1;"));
//! let doc = Document::new(path, meta);
//!
//! let doc = set_by_path(&doc, "exports.0.name", json!("x")).unwrap();
//! assert_eq!(get_by_path(&doc, "exports.0.name").unwrap(), Some(json!("x")));
//! assert!(set_by_path(&doc, "meta.id", json!("forged")).is_err());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod coerce;
mod document;
mod hash;
mod mutate;
mod path;
mod relation;

pub mod codec;
pub mod storage;

// Re-exports
pub use codec::CodecError;
pub use coerce::normalize_value;
pub use document::{
    check_source_path, detect_type, document_id, generate_meta, normalize_source_path, DocType, Document, Meta,
    FORMAT_VERSION, ID_PREFIX,
};
pub use hash::{ContentHash, HashError};
pub use mutate::{delete_by_path, get_by_path, set_by_path, MutationError};
pub use path::{segment_index, DocPath, PathError, META_KEY};
pub use relation::{normalize_reference, Relationship, DEPENDS_ON};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
