//! Line-numbered rendering of an edit for confirmation output

use std::fmt::Write;

use crate::lines::Lines;
use crate::matcher::MatchResult;

/// Render lines `start_line..=end_line` (one-based) with `context` lines on
/// either side; target lines are marked with `>`.
#[must_use]
pub fn format_context(content: &str, start_line: usize, end_line: usize, context: usize) -> String {
    let lines = Lines::new(content);
    let total = lines.len();
    let start_line = start_line.clamp(1, total);
    let end_line = end_line.clamp(start_line, total);
    let first = start_line.saturating_sub(context).max(1);
    let last = (end_line + context).min(total);
    let width = digits(last);

    let mut out = String::new();
    for n in first..=last {
        let marker = if (start_line..=end_line).contains(&n) { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {n:>width$} | {}", lines.get(n - 1));
    }
    out
}

/// Render the before/after of replacing `matched` with `replacement`,
/// bounded to `context` unchanged lines on either side.
///
/// Removed lines are prefixed `-` and numbered in the original content;
/// added lines are prefixed `+` and numbered in the edited content.
#[must_use]
pub fn format_diff(content: &str, matched: &MatchResult, replacement: &str, context: usize) -> String {
    let lines = Lines::new(content);
    let total = lines.len();
    let first = matched.start_line.clamp(1, total) - 1;
    let last = matched.end_line.clamp(first + 1, total) - 1;
    let (block_start, block_end) = lines.range(first, last);

    let start = matched.start_index.clamp(block_start, block_end);
    let end = matched.end_index.clamp(start, block_end);
    let after = format!(
        "{}{replacement}{}",
        &content[block_start..start],
        &content[end..block_end]
    );
    let after: Vec<&str> = after.split('\n').collect();

    let context_start = first.saturating_sub(context);
    let context_end = (last + context).min(total - 1);
    let width = digits(context_end + 1 + after.len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "@@ -{},{} +{},{} @@",
        first + 1,
        last - first + 1,
        first + 1,
        after.len()
    );
    for i in context_start..first {
        let _ = writeln!(out, "  {:>width$} | {}", i + 1, lines.get(i));
    }
    for i in first..=last {
        let _ = writeln!(out, "- {:>width$} | {}", i + 1, lines.get(i));
    }
    for (k, line) in after.iter().enumerate() {
        let _ = writeln!(out, "+ {:>width$} | {line}", first + k + 1);
    }
    for i in last + 1..=context_end {
        let _ = writeln!(out, "  {:>width$} | {}", i + 1, lines.get(i));
    }
    out
}

fn digits(n: usize) -> usize {
    n.max(1).to_string().len()
}
