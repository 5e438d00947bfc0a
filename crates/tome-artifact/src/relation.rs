//! Declared relationships between documents
//!
//! A relationship field (e.g. `dependsOn`) holds an ordered list whose
//! entries are either a bare reference string or a mapping with a target
//! and an optional symbol list:
//!
//! ```yaml
//! dependsOn:
//!   - src/util.ts
//!   - path: file:src/config.ts
//!     symbols: [load, Config]
//! ```

use serde_json::Value;

use crate::document::{normalize_source_path, Document};

/// Default relationship field
pub const DEPENDS_ON: &str = "dependsOn";

/// One declared reference from a document to another source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Field the reference was declared under
    pub field: String,
    /// Reference exactly as written
    pub raw: String,
    /// Normalized target source path
    pub target: String,
    /// Symbols imported from the target, if declared
    pub symbols: Vec<String>,
}

/// Normalize a reference to a plain source path.
///
/// Strips a scheme prefix (`file:`, `tome://`), `./` and a leading `/`.
/// Web URLs are external and yield `None`.
#[must_use]
pub fn normalize_reference(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return None;
    }

    let without_scheme = match reference.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest.trim_start_matches('/'),
        _ => reference,
    };
    let path = normalize_source_path(without_scheme.trim_start_matches('/'));
    Some(path)
}

// Single letters are left alone so `C:/x` is not mistaken for a scheme.
fn is_scheme(candidate: &str) -> bool {
    candidate.len() > 1
        && candidate.starts_with(|c: char| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl Document {
    /// Relationships declared under `field`, in declaration order.
    ///
    /// Entries that are neither strings nor mappings with a `path` or
    /// `target` key are skipped, as are external URLs.
    #[must_use]
    pub fn relationships(&self, field: &str) -> Vec<Relationship> {
        let Some(Value::Array(entries)) = self.content.get(field) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| parse_entry(field, entry))
            .collect()
    }

    /// Relationships across several fields, field by field
    #[must_use]
    pub fn all_relationships(&self, fields: &[String]) -> Vec<Relationship> {
        fields.iter().flat_map(|f| self.relationships(f)).collect()
    }
}

fn parse_entry(field: &str, entry: &Value) -> Option<Relationship> {
    let (raw, symbols) = match entry {
        Value::String(raw) => (raw.clone(), Vec::new()),
        Value::Object(map) => {
            let raw = map
                .get("path")
                .or_else(|| map.get("target"))
                .and_then(Value::as_str)?
                .to_string();
            let symbols = map
                .get("symbols")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            (raw, symbols)
        }
        _ => return None,
    };
    let target = normalize_reference(&raw)?;
    Some(Relationship {
        field: field.to_string(),
        raw,
        target,
        symbols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{generate_meta, DocType};
    use crate::mutate::set_by_path;
    use serde_json::json;

    fn doc_with(deps: Value) -> Document {
        let doc = Document::new("src/app.ts", generate_meta("src/app.ts", DocType::File, None));
        set_by_path(&doc, DEPENDS_ON, deps).unwrap()
    }

    #[test]
    fn normalizes_scheme_prefixes() {
        assert_eq!(normalize_reference("file:src/a.ts").as_deref(), Some("src/a.ts"));
        assert_eq!(normalize_reference("tome://src/a.ts").as_deref(), Some("src/a.ts"));
        assert_eq!(normalize_reference("./src/a.ts").as_deref(), Some("src/a.ts"));
        assert_eq!(normalize_reference("/src/a.ts").as_deref(), Some("src/a.ts"));
        assert_eq!(normalize_reference("src/a.ts").as_deref(), Some("src/a.ts"));
    }

    #[test]
    fn web_urls_are_external() {
        assert_eq!(normalize_reference("https://docs.rs/serde"), None);
        assert_eq!(normalize_reference("  "), None);
    }

    #[test]
    fn string_and_mapping_entries() {
        let doc = doc_with(json!([
            "src/util.ts",
            {"path": "file:src/config.ts", "symbols": ["load", "Config"]},
            {"target": "src/db"},
            42,
            {"symbols": ["orphaned"]}
        ]));
        let rels = doc.relationships(DEPENDS_ON);
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].target, "src/util.ts");
        assert!(rels[0].symbols.is_empty());
        assert_eq!(rels[1].raw, "file:src/config.ts");
        assert_eq!(rels[1].target, "src/config.ts");
        assert_eq!(rels[1].symbols, vec!["load", "Config"]);
        assert_eq!(rels[2].target, "src/db");
        assert!(rels.iter().all(|r| r.field == DEPENDS_ON));
    }

    #[test]
    fn missing_or_scalar_field_yields_nothing() {
        let doc = Document::new("a.ts", generate_meta("a.ts", DocType::File, None));
        assert!(doc.relationships(DEPENDS_ON).is_empty());
        let doc = set_by_path(&doc, DEPENDS_ON, json!(3)).unwrap();
        assert!(doc.relationships(DEPENDS_ON).is_empty());
    }
}
