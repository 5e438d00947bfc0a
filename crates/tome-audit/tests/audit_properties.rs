use std::fs;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use tome_artifact::{Document, DEPENDS_ON};
use tome_audit::{
    build_dependency_graph, find_dependents, get_issue_count, validate, AuditConfig, FsTree,
};
use tome_test_utils::{directory_document, discovered, file_document, memory_tree, with_field};

#[test]
fn one_byte_change_makes_document_stale() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    let source = "export const answer = 42;\n";
    fs::write(dir.path().join("src/x.ts"), source).unwrap();

    let tree = FsTree::new(dir.path());
    let inventory = vec!["src/x.ts".to_string()];
    let docs = discovered(&[
        file_document("src/x.ts", source),
        directory_document("src"),
    ]);
    let config = AuditConfig::default();

    let before = validate(&tree, &inventory, &docs, &config);
    assert!(before.stale.is_empty());
    assert!(before.uncovered.is_empty());

    fs::write(dir.path().join("src/x.ts"), b"export const answer = 43;\n").unwrap();
    let after = validate(&tree, &inventory, &docs, &config);
    assert_eq!(after.stale, vec!["tome:src/x.ts"]);
}

#[test]
fn stored_documents_are_not_directory_children() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/a.ts"), "a").unwrap();
    fs::write(dir.path().join("src/a.ts.tome.yaml"), "meta: {}").unwrap();

    let src = with_field(&directory_document("src"), "contents", json!(["a.ts"]));
    let gone = directory_document("lib");
    let tree = FsTree::new(dir.path());
    let result = validate(
        &tree,
        &["src/a.ts".to_string()],
        &discovered(&[src, gone]),
        &AuditConfig::default(),
    );

    assert!(result.contents_issues.is_empty());
    assert_eq!(result.orphans, vec!["tome:lib"]);
    assert_eq!(result.uncovered, vec!["src/a.ts"]);
    assert_eq!(get_issue_count(&result), 2);
}

#[test]
fn dependents_come_from_declared_relationships() {
    let a = with_field(&file_document("a.ts", "a"), DEPENDS_ON, json!(["b.ts"]));
    let b = file_document("b.ts", "b");
    let graph = build_dependency_graph(&[a, b], &[DEPENDS_ON.to_string()]);

    assert!(graph.get("b.ts").unwrap().used_by.contains(&"a.ts".to_string()));
    let dependents = find_dependents(&graph, &["b.ts"]);
    assert!(dependents.contains(&"a.ts".to_string()));
    assert!(!dependents.contains(&"b.ts".to_string()));
}

fn file_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}\\.ts"
}

proptest! {
    #[test]
    fn prop_uncovered_is_inventory_minus_documents(
        names in proptest::collection::btree_set(file_name(), 1..8),
        covered_mask in proptest::collection::vec(any::<bool>(), 8),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), n.as_str())).collect();
        let tree = memory_tree(&files);
        let docs: Vec<Document> = names
            .iter()
            .zip(&covered_mask)
            .filter(|(_, covered)| **covered)
            .map(|(name, _)| file_document(name, name))
            .collect();
        let expected: Vec<String> = names
            .iter()
            .zip(&covered_mask)
            .filter(|(_, covered)| !**covered)
            .map(|(name, _)| name.clone())
            .collect();

        let result = validate(&tree, &names, &discovered(&docs), &AuditConfig::default());
        prop_assert_eq!(result.uncovered, expected);
        prop_assert!(result.stale.is_empty());
        prop_assert!(result.orphans.is_empty());
    }

    #[test]
    fn prop_dependents_never_include_changed(
        edges in proptest::collection::vec((0usize..6, 0usize..6), 0..15),
        changed in proptest::collection::btree_set(0usize..6, 1..4),
    ) {
        let path = |i: usize| format!("n{i}.ts");
        let docs: Vec<Document> = (0..6)
            .map(|i| {
                let deps: Vec<String> = edges
                    .iter()
                    .filter(|(from, _)| *from == i)
                    .map(|(_, to)| path(*to))
                    .collect();
                with_field(&file_document(&path(i), ""), DEPENDS_ON, json!(deps))
            })
            .collect();
        let graph = build_dependency_graph(&docs, &[DEPENDS_ON.to_string()]);
        let changed: Vec<String> = changed.into_iter().map(path).collect();

        let direct = find_dependents(&graph, &changed);
        let transitive = graph.find_transitive_dependents(&changed);
        for p in &direct {
            prop_assert!(!changed.contains(p));
            prop_assert!(transitive.contains(p));
        }
        prop_assert!(transitive.iter().all(|p| !changed.contains(p)));
        let mut sorted = direct.clone();
        sorted.sort();
        prop_assert_eq!(direct, sorted);
    }
}
