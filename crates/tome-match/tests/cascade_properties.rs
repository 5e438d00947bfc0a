use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tome_match::{
    apply_replacement, find_all_matches, find_match, format_diff, MatchStrategy, Matcher,
    MatcherConfig, INDENTATION_CONFIDENCE,
};

fn line() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 (){};=+]{0,20}"
}

proptest! {
    #[test]
    fn prop_verbatim_substring_is_exact(
        before in proptest::collection::vec(line(), 0..6),
        target in proptest::collection::vec(line(), 1..4),
        after in proptest::collection::vec(line(), 0..6),
        replacement in "[A-Z]{1,10}",
    ) {
        let prefix: String = before.iter().map(|l| format!("{l}\n")).collect();
        let search = target.join("\n");
        let suffix: String = after.iter().map(|l| format!("\n{l}")).collect();
        let content = format!("{prefix}{search}{suffix}");

        let m = find_match(&content, &search).unwrap();
        prop_assert_eq!(m.strategy, MatchStrategy::Exact);
        prop_assert!((m.confidence - 1.0).abs() < f64::EPSILON);
        prop_assert_eq!(&content[m.start_index..m.end_index], search.as_str());

        let edited = apply_replacement(&content, &m, &replacement).unwrap();
        prop_assert_eq!(&edited[..m.start_index], &content[..m.start_index]);
        prop_assert_eq!(
            &edited[m.start_index + replacement.len()..],
            &content[m.end_index..]
        );
    }

    #[test]
    fn prop_reindented_block_is_indentation(
        body in proptest::collection::vec("[a-z][a-z0-9();]{2,16}", 2..5),
        indent in 1usize..8,
    ) {
        let pad = " ".repeat(indent);
        let content = format!(
            "start {{\n{}\n}}\n",
            body.iter().map(|l| format!("{pad}{l}")).collect::<Vec<_>>().join("\n")
        );
        let search = body.join("\n");

        let m = find_match(&content, &search).unwrap();
        prop_assert_eq!(m.strategy, MatchStrategy::Indentation);
        prop_assert!((m.confidence - INDENTATION_CONFIDENCE).abs() < f64::EPSILON);
        prop_assert_eq!((m.start_line, m.end_line), (2, body.len() + 1));
    }
}

#[test]
fn dissimilar_search_fails_without_suggestions() {
    let content = "alpha();\nbeta();\ngamma();\n";
    let failure = find_match(content, "0123456789\n9876543210").unwrap_err();
    assert!(failure.suggestions.is_empty());
    assert!(failure.message.contains("re-read"));
}

#[test]
fn suggestions_point_at_drifted_region() {
    let content = "fn load(path: &str) -> Config {\n    parse(read(path))\n}\n";
    let failure = Matcher::new(MatcherConfig::default().with_fuzzy_threshold(0.99))
        .find_match(content, "fn load(path: &Path) -> Config {\n    parse(read(path))\n}")
        .unwrap_err();
    let best = &failure.suggestions[0];
    assert_eq!((best.start_line, best.end_line), (1, 3));
    assert!(best.similarity >= 0.8);
    assert!(failure.message.contains("lines 1-3"));
}

#[test]
fn replace_all_occurrences_right_to_left() {
    let content = "log(a);\nkeep();\nlog(a);\n";
    let mut edited = content.to_string();
    for m in find_all_matches(content, "log(a);").iter().rev() {
        edited = apply_replacement(&edited, m, "trace(a);").unwrap();
    }
    assert_eq!(edited, "trace(a);\nkeep();\ntrace(a);\n");
}

#[test]
fn diff_of_whitespace_match() {
    let content = "one\nlet  x =  1;\nthree\n";
    let m = find_match(content, "let x = 1;").unwrap();
    assert_eq!(m.strategy, MatchStrategy::Whitespace);
    let diff = format_diff(content, &m, "let x = 2;", 1);
    assert_eq!(
        diff,
        "@@ -2,1 +2,1 @@\n  1 | one\n- 2 | let  x =  1;\n+ 2 | let x = 2;\n  3 | three\n"
    );
}
