//! Solution resolution.
//!
//! Builds a [`ProjectGraph`] from a solution descriptor: parses every
//! referenced project, normalizes the configuration naming, drops nodes that
//! carry no usable configuration, and links UI test projects to the
//! application projects they exercise. A single bad project never aborts the
//! graph; it is logged and left out.

use crate::config::normalize_pair;
use crate::graph::ProjectGraph;
use crate::node::{ProjectConfig, ProjectNode};
use crate::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use mx_descriptor::{ProjectFacts, SolutionFacts};
use tracing::{debug, warn};

/// Resolve a solution file into an immutable project graph.
pub fn resolve(solution_path: &Path) -> Result<ProjectGraph> {
    let facts = SolutionFacts::from_file(solution_path)?;

    let name = solution_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let mut graph = ProjectGraph {
        path: facts.path.clone(),
        name,
        configs: facts.configs.iter().map(|c| normalize_pair(c)).collect(),
        projects: BTreeMap::new(),
    };

    for entry in &facts.projects {
        // Solution folders and unloadable members point at paths that are
        // not files; that is expected, not an error.
        if !entry.path.is_file() {
            debug!(project = %entry.name, path = %entry.path.display(), "skipping solution entry without a project file");
            continue;
        }

        let project = match ProjectFacts::from_file(&entry.path) {
            Ok(project) => project,
            Err(err) => {
                warn!(project = %entry.name, %err, "excluding unreadable project");
                continue;
            }
        };

        let mappings: BTreeMap<String, String> = facts
            .mappings
            .get(&entry.id)
            .map(|m| {
                m.iter()
                    .map(|(k, v)| (normalize_pair(k), normalize_pair(v)))
                    .collect()
            })
            .unwrap_or_default();

        let configs: BTreeMap<String, ProjectConfig> = project
            .configs
            .iter()
            .map(|(key, c)| {
                (
                    normalize_pair(key),
                    ProjectConfig {
                        configuration: c.configuration.clone(),
                        platform: crate::config::normalize_platform(&c.platform),
                        output_path: c.output_path.clone(),
                        mtouch_archs: c.mtouch_archs.clone(),
                        sign_package: c.sign_package,
                        build_ipa: c.build_ipa,
                    },
                )
            })
            .collect();

        // Required invariant: a node without both a mapping and a config
        // carries nothing buildable for any requested pair.
        if mappings.is_empty() || configs.is_empty() {
            debug!(project = %entry.name, "excluding project without mappings or configs");
            continue;
        }

        let assembly_name = project.assembly_name.clone().unwrap_or_else(|| {
            entry
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&entry.name)
                .to_string()
        });

        graph.projects.insert(
            entry.id.clone(),
            ProjectNode {
                id: entry.id.clone(),
                name: entry.name.clone(),
                path: entry.path.clone(),
                api: project.api,
                test_kinds: project.test_kinds.clone(),
                output_type: project.output_type,
                assembly_name,
                android_application: project.android_application,
                referenced_ids: project.referenced_ids.clone(),
                mappings,
                configs,
                uitest_projects: Vec::new(),
            },
        );
    }

    link_uitest_edges(&mut graph);

    Ok(graph)
}

/// Record the inverse test→application edges on the application nodes.
fn link_uitest_edges(graph: &mut ProjectGraph) {
    let pairs: Vec<(String, Vec<String>)> = graph
        .uitests()
        .map(|test| {
            (
                test.id.clone(),
                test.referenced_ids.iter().cloned().collect(),
            )
        })
        .collect();

    for (test_id, referenced) in pairs {
        for referenced_id in referenced {
            if let Some(node) = graph.projects.get_mut(&referenced_id) {
                if node.is_application() {
                    node.uitest_projects.push(test_id.clone());
                }
            }
        }
    }
}
