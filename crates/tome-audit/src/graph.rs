//! Dependency graph derived from declared relationships
//!
//! Built in two passes: forward edges (`depends_on`) from each document's
//! relationship fields, then reverse edges (`used_by`). Targets without a
//! document of their own still get a node.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use tome_artifact::{normalize_source_path, Document};

/// Edges of one path in the graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Paths this one depends on, in declaration order
    pub depends_on: Vec<String>,
    /// Paths depending on this one, sorted
    pub used_by: Vec<String>,
    /// Symbols imported per dependency, where declared
    pub symbols_by_dep: BTreeMap<String, Vec<String>>,
}

/// Forward and reverse reference index over a document set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, GraphNode>,
}

impl DependencyGraph {
    /// Node for `path`
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&GraphNode> {
        self.nodes.get(path)
    }

    /// Whether `path` has a node
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Every node, by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct dependents of any of `changed`, excluding `changed`, sorted
    #[must_use]
    pub fn find_dependents<S: AsRef<str>>(&self, changed: &[S]) -> Vec<String> {
        let changed = normalized(changed);
        let dependents: BTreeSet<&str> = changed
            .iter()
            .filter_map(|path| self.nodes.get(path))
            .flat_map(|node| node.used_by.iter().map(String::as_str))
            .filter(|path| !changed.contains(*path))
            .collect();
        dependents.into_iter().map(str::to_string).collect()
    }

    /// Everything that depends on `changed`, directly or transitively,
    /// excluding `changed`, sorted
    #[must_use]
    pub fn find_transitive_dependents<S: AsRef<str>>(&self, changed: &[S]) -> Vec<String> {
        let changed = normalized(changed);
        let mut seen: BTreeSet<&str> = changed.iter().map(String::as_str).collect();
        let mut queue: VecDeque<&str> = seen.iter().copied().collect();

        while let Some(path) = queue.pop_front() {
            let Some(node) = self.nodes.get(path) else {
                continue;
            };
            for user in &node.used_by {
                if seen.insert(user) {
                    queue.push_back(user);
                }
            }
        }

        seen.into_iter()
            .filter(|p| !changed.contains(*p))
            .map(str::to_string)
            .collect()
    }

    /// Dependency cycles: groups of mutually reachable paths, and paths
    /// depending on themselves. Each group and the list are sorted.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (path, node) in &self.nodes {
            graph.add_node(path);
            for dep in &node.depends_on {
                graph.add_edge(path, dep, ());
            }
        }

        let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut scc: Vec<String> = scc.into_iter().map(str::to_string).collect();
                scc.sort();
                scc
            })
            .collect();
        cycles.sort();
        cycles
    }
}

fn normalized<S: AsRef<str>>(paths: &[S]) -> BTreeSet<String> {
    paths
        .iter()
        .map(|p| normalize_source_path(p.as_ref()))
        .collect()
}

/// Build the graph from `documents`, reading relationships from `fields`.
#[must_use]
pub fn build_dependency_graph(documents: &[Document], fields: &[String]) -> DependencyGraph {
    let mut nodes: BTreeMap<String, GraphNode> = BTreeMap::new();

    for doc in documents {
        let node = nodes.entry(doc.path().to_string()).or_default();
        for rel in doc.all_relationships(fields) {
            if !node.depends_on.contains(&rel.target) {
                node.depends_on.push(rel.target.clone());
            }
            if !rel.symbols.is_empty() {
                let symbols = node.symbols_by_dep.entry(rel.target).or_default();
                for symbol in rel.symbols {
                    if !symbols.contains(&symbol) {
                        symbols.push(symbol);
                    }
                }
            }
        }
    }

    let edges: Vec<(String, String)> = nodes
        .iter()
        .flat_map(|(path, node)| node.depends_on.iter().map(move |dep| (path.clone(), dep.clone())))
        .collect();
    for (path, dep) in edges {
        let target = nodes.entry(dep).or_default();
        if !target.used_by.contains(&path) {
            target.used_by.push(path);
        }
    }
    for node in nodes.values_mut() {
        node.used_by.sort();
    }

    tracing::debug!(nodes = nodes.len(), "dependency graph built");
    DependencyGraph { nodes }
}

/// See [`DependencyGraph::find_dependents`]
#[must_use]
pub fn find_dependents<S: AsRef<str>>(graph: &DependencyGraph, changed: &[S]) -> Vec<String> {
    graph.find_dependents(changed)
}
