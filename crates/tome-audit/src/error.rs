//! Per-document scan failures

use std::io;

use tome_artifact::CodecError;

/// A document that could not be read or decoded during a scan
///
/// Never aborts a validation run; surfaces as a
/// [`DegradedEntry`](crate::DegradedEntry).
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Document or source could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Location that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Document text is not a valid stored document
    #[error("cannot decode {path}: {source}")]
    Decode {
        /// Location that failed
        path: String,
        /// Underlying decode error
        #[source]
        source: CodecError,
    },
}

impl ScanError {
    /// Location the failure refers to
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } => path,
        }
    }
}
