//! Byte spans of `\n`-separated lines

/// Line table over a text; lines exclude their terminating `\n`
#[derive(Debug)]
pub(crate) struct Lines<'a> {
    text: &'a str,
    spans: Vec<(usize, usize)>,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut spans = Vec::new();
        let mut start = 0;
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                spans.push((start, i));
                start = i + 1;
            }
        }
        spans.push((start, text.len()));
        Self { text, spans }
    }

    pub(crate) fn len(&self) -> usize {
        self.spans.len()
    }

    /// Zero-based line text
    pub(crate) fn get(&self, index: usize) -> &'a str {
        let (start, end) = self.spans[index];
        &self.text[start..end]
    }

    pub(crate) fn all(&self) -> Vec<&'a str> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// One-based line number containing byte `offset`
    pub(crate) fn number_at(&self, offset: usize) -> usize {
        self.spans.partition_point(|&(start, _)| start <= offset).max(1)
    }

    /// Byte range covering zero-based lines `first..=last`, without the
    /// final line's terminator
    pub(crate) fn range(&self, first: usize, last: usize) -> (usize, usize) {
        (self.spans[first].0, self.spans[last].1)
    }
}

/// Split `search` into lines, ignoring one trailing newline
pub(crate) fn search_lines(search: &str) -> Vec<&str> {
    let trimmed = search.strip_suffix('\n').unwrap_or(search);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    trimmed.split('\n').collect()
}
