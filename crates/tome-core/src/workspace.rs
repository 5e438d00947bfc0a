//! The mutate, persist and audit cycle over one repository
//!
//! Every successful mutation regenerates the document's metadata from the
//! current source (new timestamp, new hash), optionally runs the model
//! parser over the serialized text, and writes the result. The workspace
//! performs no locking; callers serialize mutations per document.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use tome_artifact::storage::document_path_from_source_path;
use tome_artifact::{
    check_source_path, codec, delete_by_path, detect_type, generate_meta, set_by_path,
    DocType, Document, MutationError, META_KEY,
};
use tome_audit::{
    build_dependency_graph, validate, DependencyGraph, FsTree, SourceTree, ValidationResult,
};
use tome_match::{format_diff, Edit, MatchResult, Matcher};

use crate::config::TomeConfig;
use crate::error::TomeError;
use crate::parser::ModelParser;
use crate::store::DocumentStore;

/// Result of a search-and-replace edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// The committed document
    pub document: Document,
    /// Region of the stored text that was replaced
    pub matched: MatchResult,
    /// Line-numbered before/after of the edit
    pub diff: String,
}

/// A repository with its document store
pub struct Workspace {
    config: TomeConfig,
    store: DocumentStore,
    tree: FsTree,
    matcher: Matcher,
    parser: Option<Box<dyn ModelParser>>,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.tree.root())
            .field("config", &self.config)
            .field("parser", &self.parser.is_some())
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Open the repository at `root`, reading `tome.toml` if present.
    ///
    /// # Errors
    /// Returns error if the configuration file exists but is invalid
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, TomeError> {
        let root = root.into();
        let config = TomeConfig::discover(&root)?;
        Ok(Self::with_config(root, config))
    }

    /// Open the repository at `root` with explicit configuration
    #[must_use]
    pub fn with_config(root: impl Into<PathBuf>, config: TomeConfig) -> Self {
        let root = root.into();
        Self {
            store: DocumentStore::new(root.clone(), config.storage_dir.clone()),
            tree: FsTree::new(root),
            matcher: Matcher::new(config.matcher),
            parser: None,
            config,
        }
    }

    /// With a model parser checking every mutated document
    #[must_use]
    pub fn with_parser(mut self, parser: impl ModelParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TomeConfig {
        &self.config
    }

    /// Document store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Source tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &FsTree {
        &self.tree
    }

    /// The stored document for `source`, if any.
    ///
    /// # Errors
    /// Returns error if `source` is outside the root, or the document
    /// cannot be read or decoded
    pub fn document(&self, source: &str) -> Result<Option<Document>, TomeError> {
        let source = check_source_path(source)?;
        self.store.load(&source)
    }

    /// Set `path` in the document for `source`, creating the document on
    /// first use.
    ///
    /// # Errors
    /// Returns error if `source` is outside the root, the mutation is
    /// rejected, the model parser rejects the result, or persistence fails
    pub fn set(&self, source: &str, path: &str, value: Value) -> Result<Document, TomeError> {
        let source = check_source_path(source)?;
        let doc = match self.store.load(&source)? {
            Some(doc) => doc,
            None => {
                let doc_type = detect_type(&source);
                tracing::debug!(source = %source, doc_type = doc_type.as_str(), "creating document");
                Document::new(&source, generate_meta(&source, doc_type, None))
            }
        };
        let updated = set_by_path(&doc, path, value)?;
        self.commit(updated)
    }

    /// Delete `path` from the document for `source`.
    ///
    /// # Errors
    /// Returns error if no document exists, the deletion is rejected, or
    /// persistence fails
    pub fn delete(&self, source: &str, path: &str) -> Result<Document, TomeError> {
        let doc = self.require(source)?;
        let updated = delete_by_path(&doc, path)?;
        self.commit(updated)
    }

    /// Replace `search` with `replacement` in the stored text of the
    /// document for `source`.
    ///
    /// # Errors
    /// Returns [`TomeError::NoMatch`] with suggestions when `search` cannot
    /// be located, [`MutationError::ProtectedField`] if the edit touches
    /// `meta`, or an error if the edited text no longer decodes
    pub fn edit(
        &self,
        source: &str,
        search: &str,
        replacement: &str,
    ) -> Result<EditOutcome, TomeError> {
        let doc = self.require(source)?;
        let text = codec::to_yaml(&doc)?;
        let Edit { content, matched } = self.matcher.replace(&text, search, replacement)?;
        tracing::debug!(
            source = doc.path(),
            strategy = %matched.strategy,
            confidence = matched.confidence,
            "edit located"
        );

        let edited = codec::from_yaml(&content)?;
        if edited.meta() != doc.meta() {
            return Err(MutationError::ProtectedField(META_KEY.to_string()).into());
        }
        let diff = format_diff(&text, &matched, replacement, self.config.matcher.context_lines);
        let document = self.commit(edited)?;
        Ok(EditOutcome {
            document,
            matched,
            diff,
        })
    }

    /// Audit every stored document against the source tree.
    ///
    /// `inventory` is the caller's ignore-filtered list of source files.
    #[must_use]
    pub fn validate(&self, inventory: &[String]) -> ValidationResult {
        let documents = self.store.discover();
        validate(&self.tree, inventory, &documents, &self.config.audit_config())
    }

    /// Dependency graph over every readable stored document
    #[must_use]
    pub fn dependency_graph(&self) -> DependencyGraph {
        let documents: Vec<Document> = self
            .store
            .discover()
            .into_iter()
            .filter_map(|d| d.document.ok())
            .collect();
        build_dependency_graph(&documents, &self.config.relationship_fields)
    }

    /// Direct dependents of `changed`, excluding `changed`
    #[must_use]
    pub fn dependents<S: AsRef<str>>(&self, changed: &[S]) -> Vec<String> {
        self.dependency_graph().find_dependents(changed)
    }

    fn require(&self, source: &str) -> Result<Document, TomeError> {
        let source = check_source_path(source)?;
        self.store
            .load(&source)?
            .ok_or(TomeError::DocumentNotFound(source))
    }

    fn commit(&self, doc: Document) -> Result<Document, TomeError> {
        let source = match doc.doc_type() {
            DocType::File => match self.tree.read(doc.path()) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    tracing::warn!(source = doc.path(), error = %err, "source unreadable, writing without hash");
                    None
                }
            },
            DocType::Directory | DocType::Repository => None,
        };
        let doc = doc.with_meta(generate_meta(doc.path(), doc.doc_type(), source.as_deref()));
        let text = codec::to_yaml(&doc)?;

        if let Some(parser) = &self.parser {
            let location = document_path_from_source_path(&self.config.storage_dir, doc.path());
            let report = parser.check(&location, &text);
            if !report.success {
                tracing::warn!(
                    id = doc.id(),
                    diagnostics = report.diagnostics.len(),
                    "model parser rejected document"
                );
                return Err(TomeError::ModelRejected {
                    diagnostics: report.diagnostics,
                });
            }
        }

        self.store.write_text(doc.path(), &text)?;
        tracing::info!(id = doc.id(), "document committed");
        Ok(doc)
    }
}
