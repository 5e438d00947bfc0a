//! Path-addressed document mutation
//!
//! All operations are pure: they take a document by reference and return a
//! new one. Metadata is out of reach of every path; see [`MutationError`].

use serde_json::{Map, Value};

use crate::coerce::normalize_value;
use crate::document::Document;
use crate::path::{segment_index, DocPath, PathError, META_KEY};

/// Set `value` at `path`, returning the updated document.
///
/// The root path replaces the whole content and keeps `meta`; it requires
/// an object. Missing intermediate containers are created: a sequence when
/// the following segment is an index, a mapping otherwise. An index past
/// the end of a sequence appends.
///
/// # Errors
/// - [`MutationError::ProtectedField`] for paths under `meta`
/// - [`MutationError::InvalidRootReplacement`] for a non-object root value
/// - [`MutationError::InvalidTraversal`] when a scalar sits where a
///   container is needed
pub fn set_by_path(doc: &Document, path: &str, value: Value) -> Result<Document, MutationError> {
    let path: DocPath = path.parse()?;
    if path.is_protected() {
        return Err(MutationError::ProtectedField(path.to_string()));
    }
    let value = normalize_value(value);

    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return replace_root(doc, value);
    };

    let mut next = doc.clone();
    match parents.split_first() {
        None => {
            next.content.insert(last.clone(), value);
        }
        Some((first, rest)) => {
            let as_sequence = segment_index(&segments[1]).is_some();
            let slot = next
                .content
                .entry(first.clone())
                .or_insert_with(|| empty_container(as_sequence));
            let mut current = ensure_container(slot, as_sequence, &path, 1)?;
            for (offset, segment) in rest.iter().enumerate() {
                let depth = offset + 1;
                let as_sequence = segment_index(&segments[depth + 1]).is_some();
                current = descend(current, segment, as_sequence, &path, depth)?;
            }
            assign(current, last, value, &path, parents.len())?;
        }
    }

    tracing::debug!(doc = %doc.id(), path = %path, "set value");
    Ok(next)
}

fn replace_root(doc: &Document, value: Value) -> Result<Document, MutationError> {
    let content = match value {
        Value::Object(map) => map,
        other => {
            return Err(MutationError::InvalidRootReplacement {
                found: kind_of(&other),
            })
        }
    };
    if content.contains_key(META_KEY) {
        return Err(MutationError::ProtectedField(META_KEY.to_string()));
    }
    tracing::debug!(doc = %doc.id(), "replacing document content");
    Ok(Document {
        content,
        ..doc.clone()
    })
}

/// Remove the value at `path`, returning the updated document.
///
/// Removing a sequence element shifts later elements down. A path that
/// does not exist leaves the document unchanged.
///
/// # Errors
/// - [`MutationError::RootDeletion`] for the root path
/// - [`MutationError::ProtectedField`] for paths under `meta`
pub fn delete_by_path(doc: &Document, path: &str) -> Result<Document, MutationError> {
    let path: DocPath = path.parse()?;
    if path.is_root() {
        return Err(MutationError::RootDeletion);
    }
    if path.is_protected() {
        return Err(MutationError::ProtectedField(path.to_string()));
    }

    let mut next = doc.clone();
    if remove_at(&mut next.content, path.segments()) {
        tracing::debug!(doc = %doc.id(), path = %path, "deleted value");
    }
    Ok(next)
}

fn remove_at(content: &mut Map<String, Value>, segments: &[String]) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };
    let Some((first, rest)) = parents.split_first() else {
        return content.remove(last).is_some();
    };

    let mut current = match content.get_mut(first) {
        Some(v) => v,
        None => return false,
    };
    for segment in rest {
        current = match child_mut(current, segment) {
            Some(v) => v,
            None => return false,
        };
    }

    match current {
        Value::Object(map) => map.remove(last).is_some(),
        Value::Array(items) => match segment_index(last).filter(|&i| i < items.len()) {
            Some(i) => {
                items.remove(i);
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Read the value at `path`; the root path yields the whole content.
///
/// # Errors
/// [`MutationError::ProtectedField`] for paths under `meta`.
pub fn get_by_path(doc: &Document, path: &str) -> Result<Option<Value>, MutationError> {
    let path: DocPath = path.parse()?;
    if path.is_protected() {
        return Err(MutationError::ProtectedField(path.to_string()));
    }
    if path.is_root() {
        return Ok(Some(Value::Object(doc.content.clone())));
    }

    let segments = path.segments();
    let mut current = match doc.content.get(&segments[0]) {
        Some(v) => v,
        None => return Ok(None),
    };
    for segment in &segments[1..] {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(v) => v,
                None => return Ok(None),
            },
            Value::Array(items) => match segment_index(segment).and_then(|i| items.get(i)) {
                Some(v) => v,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
    }
    Ok(Some(current.clone()))
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment_index(segment).and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

fn empty_container(as_sequence: bool) -> Value {
    if as_sequence {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Step into `segment` of a container, creating the child if absent.
fn descend<'a>(
    current: &'a mut Value,
    segment: &str,
    as_sequence: bool,
    path: &DocPath,
    depth: usize,
) -> Result<&'a mut Value, MutationError> {
    let slot = match current {
        Value::Object(map) => map
            .entry(segment.to_string())
            .or_insert_with(|| empty_container(as_sequence)),
        Value::Array(items) => {
            let Some(index) = segment_index(segment) else {
                return Err(MutationError::traversal(path, depth, "sequence"));
            };
            let index = if index >= items.len() {
                items.push(empty_container(as_sequence));
                items.len() - 1
            } else {
                index
            };
            &mut items[index]
        }
        other => return Err(MutationError::traversal(path, depth, kind_of(other))),
    };
    ensure_container(slot, as_sequence, path, depth + 1)
}

/// A null slot counts as absent and is replaced by a fresh container.
fn ensure_container<'a>(
    slot: &'a mut Value,
    as_sequence: bool,
    path: &DocPath,
    len: usize,
) -> Result<&'a mut Value, MutationError> {
    if slot.is_null() {
        *slot = empty_container(as_sequence);
    }
    if matches!(slot, Value::Object(_) | Value::Array(_)) {
        Ok(slot)
    } else {
        Err(MutationError::traversal(path, len, kind_of(slot)))
    }
}

fn assign(
    current: &mut Value,
    segment: &str,
    value: Value,
    path: &DocPath,
    depth: usize,
) -> Result<(), MutationError> {
    match current {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let Some(index) = segment_index(segment) else {
                return Err(MutationError::traversal(path, depth, "sequence"));
            };
            if index >= items.len() {
                items.push(value);
            } else {
                items[index] = value;
            }
            Ok(())
        }
        other => Err(MutationError::traversal(path, depth, kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Errors raised by the path mutation API
///
/// These are usage errors: they are returned immediately and are never
/// worth retrying with the same input.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The path reaches into protected metadata
    #[error("'{0}' is protected metadata and cannot be accessed by path")]
    ProtectedField(String),

    /// A non-container value sits where traversal needs a container
    #[error("cannot traverse '{prefix}': found {found} where a container is required")]
    InvalidTraversal { prefix: String, found: &'static str },

    /// Whole-content replacement with something other than a mapping
    #[error("root replacement requires a mapping, got {found}")]
    InvalidRootReplacement { found: &'static str },

    /// Attempt to delete the whole document content
    #[error("cannot delete the document root")]
    RootDeletion,

    /// Malformed path
    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

impl MutationError {
    fn traversal(path: &DocPath, len: usize, found: &'static str) -> Self {
        Self::InvalidTraversal {
            prefix: path.prefix(len),
            found,
        }
    }
}
