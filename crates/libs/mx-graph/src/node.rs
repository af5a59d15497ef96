//! Project node model.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use mx_descriptor::{Api, OutputType, TestKind};
use serde::Serialize;

/// Per-configuration build settings of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    pub configuration: String,
    pub platform: String,
    /// Declared relative output path; may carry `$(Configuration)` /
    /// `$(Platform)` tokens substituted at collection time.
    pub output_path: Option<String>,
    pub mtouch_archs: Vec<String>,
    pub sign_package: bool,
    pub build_ipa: bool,
}

/// One resolved project of a solution.
///
/// Nodes are written once during resolution and read-only afterwards. A node
/// only enters the graph when it carries at least one mapping and one config;
/// solutions legitimately reference projects that carry neither (shared-code
/// projects, solution folders).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectNode {
    /// Opaque id, uppercased for case-insensitive comparison.
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub api: Api,
    pub test_kinds: BTreeSet<TestKind>,
    pub output_type: OutputType,
    pub assembly_name: String,
    pub android_application: bool,
    /// Ids of projects this project references.
    pub referenced_ids: BTreeSet<String>,
    /// Solution `Configuration|Platform` → project `Configuration|Platform`,
    /// both sides normalized.
    pub mappings: BTreeMap<String, String>,
    /// Project `Configuration|Platform` → settings, keys normalized.
    pub configs: BTreeMap<String, ProjectConfig>,
    /// Ids of UI test projects exercising this project (inverse edges).
    pub uitest_projects: Vec<String>,
}

impl ProjectNode {
    /// Project config mapped from a solution-side pair, if any.
    pub fn config_for(&self, solution_config: &str) -> Option<&ProjectConfig> {
        let key = self.mappings.get(solution_config)?;
        self.configs.get(key)
    }

    /// Whether the node is an application for its API: an executable for the
    /// Apple APIs, an application-flagged Android project, and never a test
    /// project.
    pub fn is_application(&self) -> bool {
        if self.is_uitest() {
            return false;
        }
        match self.api {
            Api::Ios | Api::Mac | Api::TvOs => self.output_type == OutputType::Exe,
            Api::Android => self.android_application,
            Api::Unknown => false,
        }
    }

    pub fn is_uitest(&self) -> bool {
        self.test_kinds.contains(&TestKind::UiTest)
    }
}
