//! Model parser boundary
//!
//! Grammar-level checking of document text is done by an external parser.
//! A [`Workspace`](crate::Workspace) configured with one runs it on every
//! mutated document before persisting.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Suspicious but accepted
    Warning,
    /// Invalid
    Error,
}

impl Severity {
    /// Lowercase name, as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// One parser finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File the finding refers to
    pub file: String,
    /// One-based line
    pub line: usize,
    /// One-based column
    pub column: usize,
    /// Severity
    pub severity: Severity,
    /// Stable diagnostic code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file,
            self.line,
            self.column,
            self.severity.as_str(),
            self.code,
            self.message
        )
    }
}

/// Outcome of checking one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Whether the text is acceptable
    pub success: bool,
    /// Findings, possibly non-empty even on success
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    /// Successful report with no findings
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            diagnostics: Vec::new(),
        }
    }

    /// Failed report
    #[inline]
    #[must_use]
    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            success: false,
            diagnostics,
        }
    }

    /// Findings of error severity
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }
}

/// Checks stored document text
pub trait ModelParser: Send + Sync {
    /// Check `text`, stored at `file`
    fn check(&self, file: &str, text: &str) -> ParseReport;
}
