//! Normalized views of text that remember where each byte came from

/// Text with interior runs of spaces and tabs collapsed to one space
///
/// Leading indentation is kept verbatim; indentation drift is the
/// indentation strategy's concern.
#[derive(Debug)]
pub(crate) struct Collapsed {
    pub(crate) text: String,
    /// Original byte offset for every normalized byte, plus a sentinel
    /// equal to the original length
    origin: Vec<usize>,
}

impl Collapsed {
    pub(crate) fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len() + 1);
        let mut in_run = false;
        let mut at_line_start = true;

        for (i, c) in source.char_indices() {
            let blank = c == ' ' || c == '\t';
            if blank && !at_line_start {
                if !in_run {
                    text.push(' ');
                    origin.push(i);
                    in_run = true;
                }
                continue;
            }
            in_run = false;
            at_line_start = c == '\n' || (at_line_start && blank);
            let before = text.len();
            text.push(c);
            origin.extend((0..text.len() - before).map(|k| i + k));
        }
        origin.push(source.len());

        Self { text, origin }
    }

    /// Original span of the normalized span `[start, end)`.
    ///
    /// A collapsed run at either edge maps to the whole original run.
    pub(crate) fn original_span(&self, start: usize, end: usize) -> (usize, usize) {
        (self.origin[start], self.origin[end])
    }
}

#[derive(Debug)]
struct StrippedLine {
    original_start: usize,
    indent: usize,
    stripped_start: usize,
}

/// Text with every line's leading whitespace removed
#[derive(Debug)]
pub(crate) struct Dedented {
    pub(crate) text: String,
    lines: Vec<StrippedLine>,
}

impl Dedented {
    pub(crate) fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut lines = Vec::new();
        let mut original_start = 0;

        for (n, line) in source.split('\n').enumerate() {
            if n > 0 {
                text.push('\n');
            }
            let stripped = line.trim_start();
            lines.push(StrippedLine {
                original_start,
                indent: line.len() - stripped.len(),
                stripped_start: text.len(),
            });
            text.push_str(stripped);
            original_start += line.len() + 1;
        }

        Self { text, lines }
    }

    fn line_at(&self, offset: usize) -> &StrippedLine {
        let index = self
            .lines
            .partition_point(|l| l.stripped_start <= offset)
            .saturating_sub(1);
        &self.lines[index]
    }

    /// Original span of the stripped span `[start, end)`.
    ///
    /// Resolution is per line: a match that begins at the first visible
    /// character of a line takes that line's indentation with it, and a
    /// match that ends on a line boundary stops before the next line's
    /// indentation.
    pub(crate) fn original_span(&self, start: usize, end: usize) -> (usize, usize) {
        let first = self.line_at(start);
        let column = start - first.stripped_start;
        let original_start = if column == 0 {
            first.original_start
        } else {
            first.original_start + first.indent + column
        };

        let last = self.line_at(end);
        let column = end - last.stripped_start;
        let original_end = if column == 0 && end > start {
            last.original_start
        } else {
            last.original_start + last.indent + column
        };

        (original_start, original_end.max(original_start))
    }
}
