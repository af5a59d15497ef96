//! Solution descriptor scanner.
//!
//! A solution file is scanned line by line with three independent probes:
//! project-reference triplets, the solution-level configuration section, and
//! the per-project configuration mapping section. Section membership is
//! tracked with an explicit state machine rather than per-feature flags.

use crate::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

pub const SOLUTION_EXT: &str = "sln";

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"Project\("\{(?P<type_id>[^}]+)\}"\)\s*=\s*"(?P<name>[^"]+)",\s*"(?P<path>[^"]+)",\s*"\{(?P<id>[^}]+)\}""#,
    )
    .expect("project line pattern")
});

static MAPPING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{(?P<id>[^}]+)\}\.(?P<key>.+?)\s*=\s*(?P<value>.+)$").expect("mapping pattern")
});

const SOLUTION_CONFIGS_BEGIN: &str = "GlobalSection(SolutionConfigurationPlatforms)";
const PROJECT_CONFIGS_BEGIN: &str = "GlobalSection(ProjectConfigurationPlatforms)";
const SECTION_END: &str = "EndGlobalSection";

/// Scanner state: which global section the cursor is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    SolutionConfigs,
    ProjectConfigs,
}

/// A project referenced by the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    /// Project id, uppercased for case-insensitive comparison.
    pub id: String,
    /// Display name from the solution entry.
    pub name: String,
    /// Absolute path, separators normalized, joined onto the solution dir.
    pub path: PathBuf,
}

/// Raw facts extracted from one solution descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionFacts {
    pub path: PathBuf,
    /// Referenced projects in declaration order.
    pub projects: Vec<ProjectEntry>,
    /// Solution-level `Configuration|Platform` pairs, as spelled in the file.
    pub configs: Vec<String>,
    /// Project id → (solution config → project config). The solution-side
    /// key keeps only the segment before the build qualifier; the
    /// project-side value has its spaces stripped, matching the spelling
    /// project descriptors use.
    pub mappings: HashMap<String, BTreeMap<String, String>>,
}

impl SolutionFacts {
    /// Scan a solution file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some(SOLUTION_EXT) {
            return Err(Error::NotASolution(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents, path))
    }

    /// Scan solution text. `path` is recorded and used to anchor project
    /// entry paths.
    pub fn parse(contents: &str, path: &Path) -> Self {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut facts = SolutionFacts {
            path: path.to_path_buf(),
            ..SolutionFacts::default()
        };

        let mut section = Section::Outside;

        for raw_line in contents.lines() {
            let line = raw_line.trim();

            if let Some(caps) = PROJECT_LINE.captures(line) {
                let rel = caps["path"].replace('\\', "/");
                facts.projects.push(ProjectEntry {
                    id: caps["id"].to_uppercase(),
                    name: caps["name"].to_string(),
                    path: base_dir.join(rel),
                });
                continue;
            }

            if line.contains(SECTION_END) {
                section = Section::Outside;
                continue;
            }
            if line.contains(SOLUTION_CONFIGS_BEGIN) {
                section = Section::SolutionConfigs;
                continue;
            }
            if line.contains(PROJECT_CONFIGS_BEGIN) {
                section = Section::ProjectConfigs;
                continue;
            }

            match section {
                Section::Outside => {}
                Section::SolutionConfigs => {
                    match line.split('=').next().map(str::trim) {
                        Some(config) if !config.is_empty() => {
                            facts.configs.push(config.to_string());
                        }
                        _ => warn!(line, "unparsable solution configuration line"),
                    }
                }
                Section::ProjectConfigs => {
                    let Some(caps) = MAPPING_LINE.captures(line) else {
                        continue;
                    };
                    let id = caps["id"].to_uppercase();
                    // `Debug|Any CPU.ActiveCfg` / `Debug|Any CPU.Build.0`:
                    // only the pair before the qualifier matters.
                    let Some(key) = caps["key"].split('.').next() else {
                        continue;
                    };
                    let value = caps["value"].trim().replace(' ', "");
                    facts
                        .mappings
                        .entry(id)
                        .or_default()
                        .insert(key.trim().to_string(), value);
                }
            }
        }

        facts
    }
}
