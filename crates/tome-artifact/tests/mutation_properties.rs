use proptest::prelude::*;
use serde_json::{json, Value};
use tome_artifact::{
    codec, delete_by_path, generate_meta, get_by_path, set_by_path, DocType, Document,
    MutationError,
};

fn empty_doc() -> Document {
    Document::new("src/x.ts", generate_meta("src/x.ts", DocType::File, Some(b"x")))
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,7}".prop_filter("meta is protected", |k| k != "meta")
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z ]{0,12}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn prop_set_then_get_then_delete(keys in proptest::collection::vec(key(), 1..5), value in leaf()) {
        let path = keys.join(".");
        let doc = set_by_path(&empty_doc(), &path, value.clone()).unwrap();
        prop_assert_eq!(get_by_path(&doc, &path).unwrap(), Some(value));

        let doc = delete_by_path(&doc, &path).unwrap();
        prop_assert_eq!(get_by_path(&doc, &path).unwrap(), None);
    }

    #[test]
    fn prop_meta_never_reachable(rest in proptest::collection::vec(key(), 0..3), value in leaf()) {
        let mut path = String::from("meta");
        for k in &rest {
            path.push('.');
            path.push_str(k);
        }
        let doc = empty_doc();
        let is_protected = matches!(
            set_by_path(&doc, &path, value),
            Err(MutationError::ProtectedField(_))
        );
        prop_assert!(is_protected);
        let is_protected = matches!(delete_by_path(&doc, &path), Err(MutationError::ProtectedField(_)));
        prop_assert!(is_protected);
    }

    #[test]
    fn prop_sequences_never_sparse(indices in proptest::collection::vec(0usize..50, 1..10)) {
        let mut doc = empty_doc();
        for (n, index) in indices.iter().enumerate() {
            doc = set_by_path(&doc, &format!("items.{index}"), json!(n)).unwrap();
            let items = doc.content()["items"].as_array().unwrap();
            prop_assert!(items.iter().all(|v| !v.is_null()));
            prop_assert!(items.len() <= n + 1);
        }
    }

    #[test]
    fn prop_mutation_preserves_meta(keys in proptest::collection::vec(key(), 1..4), value in leaf()) {
        let original = empty_doc();
        let doc = set_by_path(&original, &keys.join("."), value).unwrap();
        prop_assert_eq!(doc.meta(), original.meta());
    }
}

#[test]
fn append_clamps_out_of_range_index() {
    let doc = set_by_path(&empty_doc(), "items.0", json!("a")).unwrap();
    let doc = set_by_path(&doc, "items.5", json!("b")).unwrap();
    assert_eq!(doc.content()["items"], json!(["a", "b"]));
}

#[test]
fn protected_and_root_errors() {
    let doc = empty_doc();
    assert!(matches!(
        set_by_path(&doc, "meta", json!({})),
        Err(MutationError::ProtectedField(_))
    ));
    assert!(matches!(
        set_by_path(&doc, "meta.au", json!("x")),
        Err(MutationError::ProtectedField(_))
    ));
    assert!(matches!(
        delete_by_path(&doc, "meta"),
        Err(MutationError::ProtectedField(_))
    ));
    assert!(matches!(delete_by_path(&doc, ""), Err(MutationError::RootDeletion)));
}

#[test]
fn mutated_document_persists_and_reloads() {
    let doc = set_by_path(
        &empty_doc(),
        ".",
        json!({"summary": "entry", "dependsOn": [{"path": "src/util.ts", "symbols": ["fmt"]}]}),
    )
    .unwrap();
    let text = codec::to_yaml(&doc).unwrap();
    let reloaded = codec::from_yaml(&text).unwrap();
    assert_eq!(reloaded, doc);
    assert_eq!(reloaded.relationships("dependsOn")[0].symbols, vec!["fmt"]);
}
