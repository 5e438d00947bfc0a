//! Deterministic document persistence
//!
//! Documents are stored as YAML with `meta` first and every mapping's keys
//! sorted, so logically identical documents always serialize to identical
//! bytes.

use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::document::{Document, Meta};
use crate::path::META_KEY;

/// Serialize a document to its stored text form.
///
/// # Errors
/// Returns error if the metadata or content cannot be represented as YAML
pub fn to_yaml(doc: &Document) -> Result<String, CodecError> {
    let mut root = Mapping::new();
    root.insert(
        YamlValue::String(META_KEY.to_string()),
        serde_yaml::to_value(&doc.meta)?,
    );

    let mut keys: Vec<&String> = doc.content.keys().collect();
    keys.sort();
    for key in keys {
        root.insert(YamlValue::String(key.clone()), canonical(&doc.content[key]));
    }

    Ok(serde_yaml::to_string(&YamlValue::Mapping(root))?)
}

/// Parse a stored document.
///
/// The source path is recovered from `meta.id`.
///
/// # Errors
/// Returns error if the text is not a YAML mapping, `meta` is missing or
/// malformed, or the id does not encode a source path
pub fn from_yaml(text: &str) -> Result<Document, CodecError> {
    let value: JsonValue = serde_yaml::from_str(text)?;
    let JsonValue::Object(mut content) = value else {
        return Err(CodecError::NotAMapping);
    };
    let meta = content.remove(META_KEY).ok_or(CodecError::MissingMeta)?;
    let meta: Meta = serde_json::from_value(meta).map_err(CodecError::InvalidMeta)?;
    let path = meta
        .source_path()
        .ok_or_else(|| CodecError::InvalidId(meta.id.clone()))?
        .to_string();

    Ok(Document {
        path,
        meta,
        content,
    })
}

fn canonical(value: &JsonValue) -> YamlValue {
    match value {
        JsonValue::Null => YamlValue::Null,
        JsonValue::Bool(b) => YamlValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                YamlValue::Number(u.into())
            } else {
                YamlValue::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        JsonValue::String(s) => YamlValue::String(s.clone()),
        JsonValue::Array(items) => YamlValue::Sequence(items.iter().map(canonical).collect()),
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Mapping::new();
            for key in keys {
                out.insert(YamlValue::String(key.clone()), canonical(&map[key]));
            }
            YamlValue::Mapping(out)
        }
    }
}

/// Errors reading or writing stored documents
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// YAML syntax or representation failure
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Top level is not a mapping
    #[error("document is not a mapping")]
    NotAMapping,

    /// No `meta` block
    #[error("document has no meta block")]
    MissingMeta,

    /// `meta` present but malformed
    #[error("invalid meta block: {0}")]
    InvalidMeta(#[source] serde_json::Error),

    /// `meta.id` does not carry a source path
    #[error("document id '{0}' does not encode a source path")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{generate_meta, DocType};
    use crate::mutate::set_by_path;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Document {
        let doc = Document::new("src/x.ts", generate_meta("src/x.ts", DocType::File, Some(b"x")));
        set_by_path(
            &doc,
            ".",
            json!({
                "summary": "entry point",
                "exports": [{"name": "run", "kind": "function"}],
                "dependsOn": ["src/util.ts"],
                "count": 3,
                "ratio": 0.5
            }),
        )
        .unwrap()
    }

    #[test]
    fn meta_comes_first_and_keys_are_sorted() {
        let text = to_yaml(&sample()).unwrap();
        assert!(text.starts_with("meta:\n"));
        let count = text.find("\ncount:").unwrap();
        let deps = text.find("\ndependsOn:").unwrap();
        let summary = text.find("\nsummary:").unwrap();
        assert!(count < deps && deps < summary);
        assert!(text.find("kind:").unwrap() < text.find("name: run").unwrap());
    }

    #[test]
    fn serialization_is_byte_stable() {
        let doc = sample();
        let first = to_yaml(&doc).unwrap();
        let reparsed = from_yaml(&first).unwrap();
        assert_eq!(to_yaml(&reparsed).unwrap(), first);
    }

    #[test]
    fn parse_recovers_path_and_meta() {
        let doc = sample();
        let parsed = from_yaml(&to_yaml(&doc).unwrap()).unwrap();
        assert_eq!(parsed.path(), "src/x.ts");
        assert_eq!(parsed.meta(), doc.meta());
        assert_eq!(parsed.content(), doc.content());
    }

    #[test]
    fn root_document_round_trip() {
        let doc = Document::new("", generate_meta("", DocType::Repository, None));
        let parsed = from_yaml(&to_yaml(&doc).unwrap()).unwrap();
        assert_eq!(parsed.path(), "");
        assert_eq!(parsed.doc_type(), DocType::Repository);
    }

    #[test]
    fn missing_meta_is_reported() {
        assert!(matches!(from_yaml("summary: hi\n"), Err(CodecError::MissingMeta)));
    }

    #[test]
    fn non_mapping_is_reported() {
        assert!(matches!(from_yaml("- a\n- b\n"), Err(CodecError::NotAMapping)));
    }

    #[test]
    fn malformed_meta_is_reported() {
        let text = "meta:\n  id: tome:a.ts\n";
        assert!(matches!(from_yaml(text), Err(CodecError::InvalidMeta(_))));
    }

    #[test]
    fn foreign_id_is_reported() {
        let text = "meta:\n  version: tome/1\n  id: other:a.ts\n  type: file\n  analyzed_at: 2026-01-01T00:00:00Z\n";
        assert!(matches!(from_yaml(text), Err(CodecError::InvalidId(_))));
    }
}
