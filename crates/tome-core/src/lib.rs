//! Tome Core
//!
//! Ties the document model, the matcher and the auditor to a repository on
//! disk.
//!
//! # Architecture
//!
//! ```text
//! agent proposal ─▶ Workspace::set / delete / edit
//!                        │  set_by_path · Matcher::replace
//!                        ▼
//!                   regenerate meta ─▶ ModelParser::check ─▶ DocumentStore
//!                                                                │
//! Workspace::validate / dependency_graph ◀── discover ───────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tome_core::Workspace;
//!
//! let workspace = Workspace::open(".").unwrap();
//! workspace
//!     .set("src/x.ts", ".", json!({"summary": "entry point", "dependsOn": ["src/y.ts"]}))
//!     .unwrap();
//! let result = workspace.validate(&["src/x.ts".to_string(), "src/y.ts".to_string()]);
//! println!("{} issue(s)", tome_core::get_issue_count(&result));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod parser;
mod store;
mod workspace;

// Re-exports
pub use config::{TomeConfig, CONFIG_FILE};
pub use error::{ConfigError, StoreError, TomeError};
pub use parser::{Diagnostic, ModelParser, ParseReport, Severity};
pub use store::DocumentStore;
pub use workspace::{EditOutcome, Workspace};

pub use tome_audit::{get_issue_count, ValidationResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
