//! The matching cascade
//!
//! [`Matcher::find_match`] tries four strategies in order and stops at the
//! first hit. Each strategy reports a confidence in its own band, so the
//! number says how much the text had drifted:
//!
//! | strategy      | confidence    |
//! |---------------|---------------|
//! | `exact`       | 1.0           |
//! | `whitespace`  | 0.95          |
//! | `indentation` | 0.9           |
//! | `fuzzy`       | [0.8, 0.89]   |
//!
//! Text that drifted in both indentation and interior spacing is retried
//! after indentation with leading runs dropped as well, and reported as a
//! whitespace match.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter, Write};

use serde::{Deserialize, Serialize};

use crate::config::MatcherConfig;
use crate::lines::{search_lines, Lines};
use crate::normalize::{Collapsed, Dedented};
use crate::similarity::window_similarity;

/// Confidence of a whitespace-normalized match
pub const WHITESPACE_CONFIDENCE: f64 = 0.95;
/// Confidence of an indentation-normalized match
pub const INDENTATION_CONFIDENCE: f64 = 0.9;
/// Upper bound on fuzzy confidence, below the indentation band
pub const FUZZY_CONFIDENCE_CEILING: f64 = 0.89;

/// Candidate windows scored by the greedy large-input scan
const GREEDY_CANDIDATE_LIMIT: usize = 16;

/// Strategy that located a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Verbatim substring
    Exact,
    /// Equal after collapsing runs of spaces and tabs
    Whitespace,
    /// Equal after stripping each line's leading whitespace
    Indentation,
    /// Best line window by mean per-line similarity
    Fuzzy,
}

impl Display for MatchStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::Whitespace => "whitespace",
            Self::Indentation => "indentation",
            Self::Fuzzy => "fuzzy",
        })
    }
}

/// A located region of the content
///
/// Offsets are byte offsets into the searched content, `end_index`
/// exclusive. Line numbers are one-based and inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Strategy that found the region
    pub strategy: MatchStrategy,
    /// Trust in the match, in `[0, 1]`
    pub confidence: f64,
    /// The original text of the region
    pub matched_content: String,
    /// First byte of the region
    pub start_index: usize,
    /// One past the last byte of the region
    pub end_index: usize,
    /// First line of the region
    pub start_line: usize,
    /// Last line of the region
    pub end_line: usize,
}

/// A "did you mean" region offered when nothing matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text of the candidate region
    pub content: String,
    /// First line of the region
    pub start_line: usize,
    /// Last line of the region
    pub end_line: usize,
    /// Mean line similarity to the search text
    pub similarity: f64,
}

/// No region matched; carries ranked suggestions for a corrected retry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct MatchFailure {
    /// Best candidate regions, most similar first
    pub suggestions: Vec<Suggestion>,
    /// Guidance for the caller
    pub message: String,
}

/// Cascade matcher with configurable thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

/// Result of a find-and-replace
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    /// Content after the replacement
    pub content: String,
    /// Region that was replaced
    pub matched: MatchResult,
}

struct Window {
    start: usize,
    score: f64,
}

impl Matcher {
    /// Create matcher with the given configuration
    #[inline]
    #[must_use]
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Locate `search` in `content`.
    ///
    /// # Errors
    /// Returns [`MatchFailure`] with up to `max_suggestions` similar regions
    /// when no strategy succeeds.
    pub fn find_match(&self, content: &str, search: &str) -> Result<MatchResult, MatchFailure> {
        if search.is_empty() {
            return Err(MatchFailure {
                suggestions: Vec::new(),
                message: "The search text is empty; provide the exact text to replace.".into(),
            });
        }

        let lines = Lines::new(content);
        let found = exact(content, search)
            .map(|(s, e)| (MatchStrategy::Exact, 1.0, s, e))
            .or_else(|| {
                whitespace(content, search)
                    .map(|(s, e)| (MatchStrategy::Whitespace, WHITESPACE_CONFIDENCE, s, e))
            })
            .or_else(|| {
                indentation(content, search)
                    .map(|(s, e)| (MatchStrategy::Indentation, INDENTATION_CONFIDENCE, s, e))
            })
            .or_else(|| {
                dedented_whitespace(content, search)
                    .map(|(s, e)| (MatchStrategy::Whitespace, WHITESPACE_CONFIDENCE, s, e))
            });

        if let Some((strategy, confidence, start, end)) = found {
            tracing::debug!(%strategy, confidence, start, end, "match found");
            return Ok(build_result(content, &lines, strategy, confidence, start, end));
        }

        let search = search_lines(search);
        let windows = self.score_windows(&lines, &search);
        let accepted = if self.is_large(&lines, &search) {
            windows.iter().find(|w| w.score >= self.config.fuzzy_threshold)
        } else {
            windows
                .iter()
                .filter(|w| w.score >= self.config.fuzzy_threshold)
                .fold(None, |best: Option<&Window>, w| match best {
                    Some(b) if b.score >= w.score => Some(b),
                    _ => Some(w),
                })
        };

        if let Some(window) = accepted {
            let (start, end) = lines.range(window.start, window.start + search.len() - 1);
            let confidence = window.score.min(FUZZY_CONFIDENCE_CEILING);
            tracing::debug!(score = window.score, start, end, "fuzzy match found");
            return Ok(build_result(
                content,
                &lines,
                MatchStrategy::Fuzzy,
                confidence,
                start,
                end,
            ));
        }

        Err(self.failure(&lines, search.len(), windows))
    }

    /// Every non-overlapping match, left to right
    #[must_use]
    pub fn find_all_matches(&self, content: &str, search: &str) -> Vec<MatchResult> {
        let mut matches = Vec::new();
        let mut offset = 0;
        let mut line_offset = 0;

        while offset <= content.len() {
            let rest = &content[offset..];
            let Ok(mut found) = self.find_match(rest, search) else {
                break;
            };
            let consumed = found.end_index;
            found.start_index += offset;
            found.end_index += offset;
            found.start_line += line_offset;
            found.end_line += line_offset;
            matches.push(found);

            if consumed == 0 {
                break;
            }
            line_offset += rest[..consumed].matches('\n').count();
            offset += consumed;
        }
        matches
    }

    /// Find `search` and replace it with `replacement`.
    ///
    /// # Errors
    /// Returns [`MatchFailure`] when `search` cannot be located.
    pub fn replace(
        &self,
        content: &str,
        search: &str,
        replacement: &str,
    ) -> Result<Edit, MatchFailure> {
        let matched = self.find_match(content, search)?;
        let content = splice(content, matched.start_index, matched.end_index, replacement);
        Ok(Edit { content, matched })
    }

    fn is_large(&self, lines: &Lines<'_>, search: &[&str]) -> bool {
        lines.len().saturating_mul(search.len()) > self.config.large_input_threshold
    }

    /// Score the windows the fuzzy strategy and the suggestion scan look at.
    ///
    /// Normally every window of the search's height is scored. On large
    /// inputs only windows anchored by an exactly equal (trimmed) line are
    /// scored, in content order, which bounds the scan to one pass.
    fn score_windows(&self, lines: &Lines<'_>, search: &[&str]) -> Vec<Window> {
        let height = search.len();
        if height == 0 || lines.len() < height {
            return Vec::new();
        }
        let content = lines.all();
        let score = |start: usize| Window {
            start,
            score: window_similarity(&content[start..start + height], search),
        };

        if self.is_large(lines, search) {
            tracing::debug!(
                content_lines = lines.len(),
                search_lines = height,
                "large input, using anchored alignment"
            );
            return anchored_starts(&content, search)
                .into_iter()
                .map(score)
                .collect();
        }
        (0..=content.len() - height).map(score).collect()
    }

    fn failure(&self, lines: &Lines<'_>, height: usize, mut windows: Vec<Window>) -> MatchFailure {
        windows.retain(|w| w.score >= self.config.suggestion_threshold);
        windows.sort_by(|a, b| b.score.total_cmp(&a.score));
        windows.truncate(self.config.max_suggestions);

        let suggestions: Vec<Suggestion> = windows
            .iter()
            .map(|w| Suggestion {
                content: (w.start..w.start + height)
                    .map(|i| lines.get(i))
                    .collect::<Vec<_>>()
                    .join("\n"),
                start_line: w.start + 1,
                end_line: w.start + height,
                similarity: w.score,
            })
            .collect();

        let mut message = String::from(
            "Could not find the search text (tried exact, whitespace, indentation and fuzzy matching).",
        );
        if suggestions.is_empty() {
            message.push_str(" No similar region exists.");
        } else {
            message.push_str(" Closest regions:");
            for s in &suggestions {
                let _ = write!(
                    message,
                    " lines {}-{} ({:.0}% similar);",
                    s.start_line,
                    s.end_line,
                    s.similarity * 100.0
                );
            }
        }
        message.push_str(
            " The content may have changed: re-read the current content and retry with text copied from it.",
        );
        tracing::debug!(suggestions = suggestions.len(), "no match");

        MatchFailure {
            suggestions,
            message,
        }
    }
}

fn build_result(
    content: &str,
    lines: &Lines<'_>,
    strategy: MatchStrategy,
    confidence: f64,
    start: usize,
    end: usize,
) -> MatchResult {
    let start_line = lines.number_at(start);
    let end_line = if end > start {
        lines.number_at(end - 1)
    } else {
        start_line
    };
    MatchResult {
        strategy,
        confidence,
        matched_content: content[start..end].to_string(),
        start_index: start,
        end_index: end,
        start_line,
        end_line,
    }
}

fn exact(content: &str, search: &str) -> Option<(usize, usize)> {
    content.find(search).map(|s| (s, s + search.len()))
}

fn whitespace(content: &str, search: &str) -> Option<(usize, usize)> {
    let content = Collapsed::new(content);
    let search = Collapsed::new(search);
    let at = content.text.find(&search.text)?;
    Some(content.original_span(at, at + search.text.len()))
}

fn indentation(content: &str, search: &str) -> Option<(usize, usize)> {
    let content = Dedented::new(content);
    let search = Dedented::new(search);
    if search.text.trim().is_empty() {
        return None;
    }
    let at = content.text.find(&search.text)?;
    Some(content.original_span(at, at + search.text.len()))
}

/// Both normalizations at once: strip indentation, then collapse runs
fn dedented_whitespace(content: &str, search: &str) -> Option<(usize, usize)> {
    let content = Dedented::new(content);
    let search = Dedented::new(search);
    if search.text.trim().is_empty() {
        return None;
    }
    let collapsed = Collapsed::new(&content.text);
    let needle = Collapsed::new(&search.text);
    let at = collapsed.text.find(&needle.text)?;
    let (start, end) = collapsed.original_span(at, at + needle.text.len());
    Some(content.original_span(start, end))
}

/// Window starts implied by content lines equal to some search line, in
/// content order
fn anchored_starts(content: &[&str], search: &[&str]) -> Vec<usize> {
    let height = search.len();
    let mut first_index: HashMap<&str, usize> = HashMap::new();
    for (j, line) in search.iter().enumerate() {
        let line = line.trim();
        if !line.is_empty() {
            first_index.entry(line).or_insert(j);
        }
    }

    let mut seen = HashSet::new();
    let mut starts = Vec::new();
    for (i, line) in content.iter().enumerate() {
        let Some(&j) = first_index.get(line.trim()) else {
            continue;
        };
        if i < j || i - j + height > content.len() {
            continue;
        }
        if seen.insert(i - j) {
            starts.push(i - j);
            if starts.len() == GREEDY_CANDIDATE_LIMIT {
                break;
            }
        }
    }
    starts
}

/// Replace `[start, end)` of `content`.
///
/// # Errors
/// Returns [`SpliceError`] if the span is out of range or splits a char.
pub fn apply_replacement(
    content: &str,
    matched: &MatchResult,
    replacement: &str,
) -> Result<String, SpliceError> {
    let (start, end) = (matched.start_index, matched.end_index);
    if start > end
        || end > content.len()
        || !content.is_char_boundary(start)
        || !content.is_char_boundary(end)
    {
        return Err(SpliceError::OutOfRange {
            start,
            end,
            len: content.len(),
        });
    }
    Ok(splice(content, start, end, replacement))
}

fn splice(content: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() - (end - start) + replacement.len());
    out.push_str(&content[..start]);
    out.push_str(replacement);
    out.push_str(&content[end..]);
    out
}

/// A match span that does not fit the content it is applied to
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpliceError {
    /// Span outside the content or not on char boundaries
    #[error("span {start}..{end} does not fit content of length {len}")]
    #[allow(missing_docs)]
    OutOfRange { start: usize, end: usize, len: usize },
}

/// [`Matcher::find_match`] with default thresholds
///
/// # Errors
/// See [`Matcher::find_match`].
pub fn find_match(content: &str, search: &str) -> Result<MatchResult, MatchFailure> {
    Matcher::default().find_match(content, search)
}

/// [`Matcher::find_all_matches`] with default thresholds
#[must_use]
pub fn find_all_matches(content: &str, search: &str) -> Vec<MatchResult> {
    Matcher::default().find_all_matches(content, search)
}
