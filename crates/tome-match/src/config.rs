//! Matcher tuning

use serde::{Deserialize, Serialize};

/// Thresholds for the matching cascade
///
/// The defaults are the values the matcher has always used; they are
/// exposed so callers can tune them per workspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum window score for a fuzzy match to be accepted
    pub fuzzy_threshold: f64,
    /// Minimum window score for a region to be offered as a suggestion
    pub suggestion_threshold: f64,
    /// Maximum number of suggestions on failure
    pub max_suggestions: usize,
    /// Content lines × search lines above which the fuzzy scan switches to
    /// greedy anchored alignment
    pub large_input_threshold: usize,
    /// Lines of context around an edit in diff output
    pub context_lines: usize,
}

impl MatcherConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With fuzzy acceptance threshold
    #[inline]
    #[must_use]
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// With suggestion threshold
    #[inline]
    #[must_use]
    pub fn with_suggestion_threshold(mut self, threshold: f64) -> Self {
        self.suggestion_threshold = threshold;
        self
    }

    /// With large-input threshold
    #[inline]
    #[must_use]
    pub fn with_large_input_threshold(mut self, threshold: usize) -> Self {
        self.large_input_threshold = threshold;
        self
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.8,
            suggestion_threshold: 0.5,
            max_suggestions: 3,
            large_input_threshold: 1_000_000,
            context_lines: 2,
        }
    }
}
