//! Tome Layered Matcher
//!
//! Locates a region of text from an approximate description of it and
//! splices in a replacement.
//!
//! # Overview
//!
//! - **Cascade**: exact → whitespace → indentation → fuzzy line window
//! - **Confidence**: a distinct band per strategy, usable as a trust signal
//! - **Failure as data**: [`MatchFailure`] carries ranked "did you mean"
//!   regions instead of a bare error
//! - **Bounded latency**: large inputs switch the fuzzy scan to anchored
//!   alignment
//!
//! # Example
//!
//! ```rust
//! use tome_match::{apply_replacement, find_match, MatchStrategy};
//!
//! let content = "fn main() {\n    run();\n}\n";
//! let m = find_match(content, "fn main() {\n  run();\n}").unwrap();
//! assert_eq!(m.strategy, MatchStrategy::Indentation);
//!
//! let edited = apply_replacement(content, &m, "fn main() {}").unwrap();
//! assert_eq!(edited, "fn main() {}\n");
//! ```

#![warn(missing_docs)]

mod config;
mod diff;
mod lines;
mod matcher;
mod normalize;
pub mod similarity;

// Re-exports
pub use config::MatcherConfig;
pub use diff::{format_context, format_diff};
pub use matcher::{
    apply_replacement, find_all_matches, find_match, Edit, MatchFailure, MatchResult,
    MatchStrategy, Matcher, SpliceError, Suggestion, FUZZY_CONFIDENCE_CEILING,
    INDENTATION_CONFIDENCE, WHITESPACE_CONFIDENCE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
