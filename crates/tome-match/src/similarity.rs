//! Line similarity scoring

/// Levenshtein edit distance over chars
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `1 - distance / longer length`, in `[0, 1]`; two empty strings are identical
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Mean trimmed-line similarity of two equally long line slices
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn window_similarity(window: &[&str], search: &[&str]) -> f64 {
    if search.is_empty() {
        return 0.0;
    }
    let total: f64 = window
        .iter()
        .zip(search)
        .map(|(a, b)| similarity(a.trim(), b.trim()))
        .sum();
    total / search.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn distance_counts_chars_not_bytes() {
        assert_eq!(levenshtein("héllo", "hello"), 1);
    }

    #[test]
    fn similarity_bounds() {
        assert!((similarity("same", "same") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("abc", "xyz").abs() < f64::EPSILON);
        let s = similarity("return a + b;", "return a - b;");
        assert!(s > 0.9 && s < 1.0);
    }

    #[test]
    fn window_similarity_trims_lines() {
        let window = ["    let x = 1;", "  call(x);"];
        let search = ["let x = 1;", "call(x);"];
        assert!((window_similarity(&window, &search) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn window_similarity_is_mean() {
        let window = ["abcd", "zzzz"];
        let search = ["abcd", "abcd"];
        assert!((window_similarity(&window, &search) - 0.5).abs() < 1e-9);
    }
}
