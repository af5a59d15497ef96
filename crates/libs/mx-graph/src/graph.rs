//! Resolved solution graph.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::node::ProjectNode;

/// Immutable view of a resolved solution: its valid project nodes, the
/// solution-wide configuration list, and the path it was resolved from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectGraph {
    pub path: PathBuf,
    pub name: String,
    /// Solution-level `Configuration|Platform` pairs, normalized.
    pub configs: Vec<String>,
    /// Valid project nodes keyed by id.
    pub projects: BTreeMap<String, ProjectNode>,
}

impl ProjectGraph {
    /// Look a node up by id, case-insensitively.
    pub fn get(&self, id: &str) -> Option<&ProjectNode> {
        self.projects.get(&id.to_uppercase())
    }

    /// Whether the solution declares the given normalized pair.
    pub fn has_config(&self, pair: &str) -> bool {
        self.configs.iter().any(|c| c == pair)
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ProjectNode> {
        self.projects.values()
    }

    /// Application-classified nodes.
    pub fn applications(&self) -> impl Iterator<Item = &ProjectNode> {
        self.nodes().filter(|n| n.is_application())
    }

    /// UI-test-classified nodes.
    pub fn uitests(&self) -> impl Iterator<Item = &ProjectNode> {
        self.nodes().filter(|n| n.is_uitest())
    }
}
