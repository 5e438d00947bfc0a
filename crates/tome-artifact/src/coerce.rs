//! Input normalization for values handed to the mutator
//!
//! Callers sometimes stringify structured data (`"{\"a\": 1}"` or
//! `"name: foo"`). [`normalize_value`] turns those strings back into
//! structure before insertion. It runs only inside `set_by_path`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static URL_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z][a-z0-9+.-]*://|www\.|mailto:)").expect("valid url pattern")
});

static KEY_VALUE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*[A-Za-z_][A-Za-z0-9_.-]*[ \t]*:([ \t]|$)").expect("valid key pattern")
});

/// Reinterpret a stringified object or array; anything else passes through.
///
/// Only two trigger shapes are recognized: bracketed JSON (`{..}`, `[..]`)
/// and `key: value` lines. URL-shaped strings are never touched, and a
/// parse that yields a scalar is discarded.
#[must_use]
pub fn normalize_value(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };
    match parse_structured(text) {
        Some(parsed) => {
            tracing::debug!(len = text.len(), "coerced stringified value into structure");
            parsed
        }
        None => value,
    }
}

fn parse_structured(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() || URL_LIKE.is_match(trimmed) {
        return None;
    }

    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if bracketed {
        let parsed = serde_json::from_str::<Value>(trimmed)
            .ok()
            .or_else(|| serde_yaml::from_str::<Value>(trimmed).ok());
        return parsed.filter(is_structured);
    }

    let first_line = trimmed.lines().find(|l| !l.trim().is_empty())?;
    if !KEY_VALUE_LINE.is_match(first_line) {
        return None;
    }
    serde_yaml::from_str::<Value>(text)
        .ok()
        .filter(is_structured)
}

fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_string_is_parsed() {
        let v = normalize_value(json!(r#"{"name": "run", "async": true}"#));
        assert_eq!(v, json!({"name": "run", "async": true}));
    }

    #[test]
    fn json_array_string_is_parsed() {
        let v = normalize_value(json!(r#"["a", "b"]"#));
        assert_eq!(v, json!(["a", "b"]));
    }

    #[test]
    fn flow_yaml_in_brackets_is_parsed() {
        let v = normalize_value(json!("{name: run, count: 2}"));
        assert_eq!(v, json!({"name": "run", "count": 2}));
    }

    #[test]
    fn single_key_value_line_is_parsed() {
        let v = normalize_value(json!("purpose: parses config"));
        assert_eq!(v, json!({"purpose": "parses config"}));
    }

    #[test]
    fn multi_line_key_values_are_parsed() {
        let v = normalize_value(json!("name: load\nreturns: Config\nthrows:\n  - IoError\n"));
        assert_eq!(
            v,
            json!({"name": "load", "returns": "Config", "throws": ["IoError"]})
        );
    }

    #[test]
    fn urls_are_left_alone() {
        let url = "https://example.com/a: b";
        assert_eq!(normalize_value(json!(url)), json!(url));
        assert_eq!(normalize_value(json!("www.example.com")), json!("www.example.com"));
    }

    #[test]
    fn plain_prose_is_left_alone() {
        let prose = "Loads the config file and validates it.";
        assert_eq!(normalize_value(json!(prose)), json!(prose));
    }

    #[test]
    fn scalar_parse_results_are_discarded() {
        assert_eq!(normalize_value(json!("42")), json!("42"));
        assert_eq!(normalize_value(json!("[not json")), json!("[not json"));
    }

    #[test]
    fn non_strings_pass_through() {
        assert_eq!(normalize_value(json!(7)), json!(7));
        assert_eq!(normalize_value(json!({"a": "b: c"})), json!({"a": "b: c"}));
    }
}
