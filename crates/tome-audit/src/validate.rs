//! Coverage and consistency audit of a document set against its source tree
//!
//! A run never fails as a whole. Documents that cannot be read or decoded,
//! and sources that exist but cannot be hashed, are reported in
//! [`ValidationResult::degraded`] and the rest of the scan proceeds.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tome_artifact::storage::is_storage_entry;
use tome_artifact::{normalize_source_path, ContentHash, DocType, Document};

use crate::config::AuditConfig;
use crate::error::ScanError;
use crate::tree::SourceTree;

/// A stored document as found by discovery, parsed or not
#[derive(Debug)]
pub struct DiscoveredDocument {
    /// Where the document was found
    pub location: String,
    /// The parsed document, or why it could not be parsed
    pub document: Result<Document, ScanError>,
}

impl DiscoveredDocument {
    /// A successfully parsed document
    #[must_use]
    pub fn parsed(location: impl Into<String>, document: Document) -> Self {
        Self {
            location: location.into(),
            document: Ok(document),
        }
    }

    /// A document that failed to load
    #[must_use]
    pub fn failed(error: ScanError) -> Self {
        Self {
            location: error.path().to_string(),
            document: Err(error),
        }
    }

    /// The parsed document, if any
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref().ok()
    }
}

/// Difference between a directory document's declared children and the
/// directory on disk
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentsIssue {
    /// Directory path
    pub path: String,
    /// Declared but absent, or every child when nothing is declared
    pub missing: Vec<String>,
    /// Present but undeclared
    pub extra: Vec<String>,
}

/// A relationship target that resolves to neither a document nor a source
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaleReference {
    /// Declaring document
    pub document_id: String,
    /// Field the reference was declared under
    pub field: String,
    /// Reference as written
    pub reference: String,
}

/// A document or source the scan could not process
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DegradedEntry {
    /// Document location or id
    pub document: String,
    /// What went wrong
    pub message: String,
}

/// Outcome of one validation run; every list is sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Source files and directories without a document
    pub uncovered: Vec<String>,
    /// Ids of documents whose source no longer exists
    pub orphans: Vec<String>,
    /// Ids of file documents whose recorded hash no longer matches
    pub stale: Vec<String>,
    /// Directory documents disagreeing with the directory listing
    pub contents_issues: Vec<ContentsIssue>,
    /// Unresolvable relationship references
    pub stale_references: Vec<StaleReference>,
    /// Items skipped because they could not be read
    pub degraded: Vec<DegradedEntry>,
}

impl ValidationResult {
    /// See [`get_issue_count`]
    #[must_use]
    pub fn issue_count(&self) -> usize {
        let contents: usize = self
            .contents_issues
            .iter()
            .map(|i| i.missing.len() + i.extra.len())
            .sum();
        self.uncovered.len() + contents + self.orphans.len() + self.stale.len()
    }

    /// No issues, stale references or degraded entries
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0 && self.stale_references.is_empty() && self.degraded.is_empty()
    }
}

/// Blocking issue count: uncovered, contents mismatches, orphans and stale.
///
/// Stale references are not included; callers that treat them as blocking
/// add `result.stale_references.len()`.
#[must_use]
pub fn get_issue_count(result: &ValidationResult) -> usize {
    result.issue_count()
}

/// Audit `documents` against `tree`.
///
/// `inventory` is the already-filtered list of source file paths; the
/// directories containing them are derived from it.
pub fn validate<T>(
    tree: &T,
    inventory: &[String],
    documents: &[DiscoveredDocument],
    config: &AuditConfig,
) -> ValidationResult
where
    T: SourceTree + ?Sized,
{
    let mut result = ValidationResult::default();

    let mut parsed = Vec::with_capacity(documents.len());
    for discovered in documents {
        match &discovered.document {
            Ok(doc) => parsed.push(doc),
            Err(err) => {
                tracing::warn!(location = %discovered.location, error = %err, "degraded document");
                result.degraded.push(DegradedEntry {
                    document: discovered.location.clone(),
                    message: err.to_string(),
                });
            }
        }
    }
    let documented: BTreeSet<&str> = parsed.iter().map(|d| d.path()).collect();

    result.uncovered = uncovered(inventory, &documented);

    let (present, orphaned): (Vec<&Document>, Vec<&Document>) =
        parsed.iter().copied().partition(|d| tree.exists(d.path()));
    result.orphans = orphaned.iter().map(|d| d.id().to_string()).collect();

    check_stale(tree, &present, &mut result);

    for doc in present.iter().filter(|d| d.doc_type() == DocType::Directory) {
        match tree.list_dir(doc.path()) {
            Ok(names) => {
                let actual: BTreeSet<String> = names
                    .into_iter()
                    .filter(|n| !is_storage_entry(&config.storage_dir, n))
                    .collect();
                let declared = declared_children(doc.content().get(&config.contents_field));
                if let Some(issue) = contents_issue(doc.path(), declared, actual) {
                    result.contents_issues.push(issue);
                }
            }
            Err(source) => result.degraded.push(degraded(ScanError::Io {
                path: doc.path().to_string(),
                source,
            })),
        }
    }

    for doc in &parsed {
        for rel in doc.all_relationships(&config.relationship_fields) {
            if !documented.contains(rel.target.as_str()) && !tree.exists(&rel.target) {
                result.stale_references.push(StaleReference {
                    document_id: doc.id().to_string(),
                    field: rel.field,
                    reference: rel.raw,
                });
            }
        }
    }

    result.orphans.sort();
    result.stale.sort();
    result.contents_issues.sort();
    result.stale_references.sort();
    result.degraded.sort();

    tracing::info!(
        uncovered = result.uncovered.len(),
        orphans = result.orphans.len(),
        stale = result.stale.len(),
        contents_issues = result.contents_issues.len(),
        stale_references = result.stale_references.len(),
        degraded = result.degraded.len(),
        "validation complete"
    );
    result
}

/// Files and their ancestor directories, minus documented paths. The root
/// is covered by the repository document and not required.
fn uncovered(inventory: &[String], documented: &BTreeSet<&str>) -> Vec<String> {
    let mut expected = BTreeSet::new();
    for path in inventory {
        let path = normalize_source_path(path);
        if path.is_empty() {
            continue;
        }
        let mut dir = path.as_str();
        while let Some((parent, _)) = dir.rsplit_once('/') {
            expected.insert(parent.to_string());
            dir = parent;
        }
        expected.insert(path);
    }
    expected
        .into_iter()
        .filter(|p| !documented.contains(p.as_str()))
        .collect()
}

// Directory and repository documents have no single hashable source;
// documents never hashed are not stale.
fn check_stale<T>(tree: &T, present: &[&Document], result: &mut ValidationResult)
where
    T: SourceTree + ?Sized,
{
    let hashed: Vec<(&Document, ContentHash)> = present
        .iter()
        .filter(|d| d.doc_type() == DocType::File)
        .filter_map(|d| d.meta().analyzed_hash.map(|h| (*d, h)))
        .collect();

    let outcomes: Vec<_> = hashed
        .par_iter()
        .map(|(doc, recorded)| {
            let current = tree.read(doc.path()).map(|bytes| ContentHash::compute(&bytes));
            (*doc, *recorded, current)
        })
        .collect();

    for (doc, recorded, current) in outcomes {
        match current {
            Ok(current) if current == recorded => {}
            Ok(current) => {
                tracing::debug!(
                    id = doc.id(),
                    recorded = %recorded.short(),
                    current = %current.short(),
                    "stale document"
                );
                result.stale.push(doc.id().to_string());
            }
            Err(source) => result.degraded.push(degraded(ScanError::Io {
                path: doc.path().to_string(),
                source,
            })),
        }
    }
}

fn degraded(err: ScanError) -> DegradedEntry {
    tracing::warn!(error = %err, "degraded source");
    DegradedEntry {
        document: err.path().to_string(),
        message: err.to_string(),
    }
}

/// Child names declared on a directory document: a list of names or of
/// `{name|path}` mappings, or a mapping keyed by name.
fn declared_children(value: Option<&Value>) -> Option<BTreeSet<String>> {
    match value? {
        Value::Array(items) => Some(items.iter().filter_map(child_name).collect()),
        Value::Object(map) => Some(map.keys().map(|k| leaf_name(k)).collect()),
        _ => None,
    }
}

fn child_name(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(leaf_name(s)),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("path"))
            .and_then(Value::as_str)
            .map(leaf_name),
        _ => None,
    }
}

fn leaf_name(name: &str) -> String {
    let name = normalize_source_path(name);
    name.rsplit('/').next().unwrap_or_default().to_string()
}

fn contents_issue(
    path: &str,
    declared: Option<BTreeSet<String>>,
    actual: BTreeSet<String>,
) -> Option<ContentsIssue> {
    let (missing, extra): (Vec<String>, Vec<String>) = match declared {
        None => (actual.into_iter().collect(), Vec::new()),
        Some(declared) => (
            declared.difference(&actual).cloned().collect(),
            actual.difference(&declared).cloned().collect(),
        ),
    };
    if missing.is_empty() && extra.is_empty() {
        return None;
    }
    Some(ContentsIssue {
        path: path.to_string(),
        missing,
        extra,
    })
}
