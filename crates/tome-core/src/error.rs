//! Error types for Tome Core
//!
//! Mutation errors are usage errors and are surfaced verbatim. A failed
//! match is recoverable: [`TomeError::NoMatch`] carries the ranked
//! suggestions for a corrected retry.

use std::io;
use std::path::PathBuf;

use tome_artifact::{CodecError, MutationError, PathError};
use tome_match::MatchFailure;

use crate::parser::Diagnostic;

/// Main Tome error type
#[derive(Debug, thiserror::Error)]
pub enum TomeError {
    /// Rejected path mutation
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Search text not found
    #[error(transparent)]
    NoMatch(#[from] MatchFailure),

    /// Stored document could not be encoded or decoded
    #[error("document encoding error: {0}")]
    Codec(#[from] CodecError),

    /// Document storage failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration failure
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source path outside the repository root
    #[error("invalid source path: {0}")]
    SourcePath(#[from] PathError),

    /// No document exists for the source path
    #[error("no document for '{0}'")]
    DocumentNotFound(String),

    /// The model parser rejected the mutated document
    #[error("model rejected with {} diagnostic(s)", diagnostics.len())]
    ModelRejected {
        /// Parser diagnostics
        diagnostics: Vec<Diagnostic>,
    },
}

impl TomeError {
    /// Whether the caller can retry with corrected input
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoMatch(_) | Self::ModelRejected { .. })
    }
}

/// Document store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading a stored document failed
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing a stored document failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// A value is present but unusable
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
