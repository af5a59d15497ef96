//! Artifact collection.
//!
//! After a successful build run, locates the outputs each project produced:
//! app bundles and archive bundles for the Apple APIs, packages for Android,
//! test assemblies for UI test projects. Absence is meaningful: a library
//! project produces nothing deployable, so a project with no located
//! artifact is simply omitted from the manifest.

use crate::generator::{BuildRequest, is_archiveable};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use mx_config::Toolchain;
use mx_descriptor::Api;
use mx_graph::ProjectGraph;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static ARCHIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    // `SampleApp.iOS 10-07-16 3.41 PM 2.xcarchive`
    Regex::new(r"^(?P<name>.+) (?P<ts>\d{2}-\d{2}-\d{2} \d{1,2}\.\d{2} (?:AM|PM))(?: (?P<idx>\d+))?\.xcarchive$")
        .expect("archive name pattern")
});

const ARCHIVE_DIR_DATE: &str = "%Y-%m-%d";
const ARCHIVE_TIMESTAMP: &str = "%m-%d-%y %I.%M %p";

/// Located outputs of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectArtifacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apk: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xcarchive: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uitest_assemblies: Vec<PathBuf>,
}

impl ProjectArtifacts {
    pub fn is_empty(&self) -> bool {
        self.app.is_none()
            && self.apk.is_none()
            && self.xcarchive.is_none()
            && self.uitest_assemblies.is_empty()
    }
}

/// Project id → located outputs. Only projects with at least one artifact
/// on disk appear.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactManifest {
    #[serde(flatten)]
    pub projects: BTreeMap<String, ProjectArtifacts>,
}

impl ArtifactManifest {
    pub fn get(&self, id: &str) -> Option<&ProjectArtifacts> {
        self.projects.get(&id.to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Artifact collector over one resolved graph.
pub struct Collector<'a> {
    graph: &'a ProjectGraph,
    toolchain: &'a Toolchain,
}

impl<'a> Collector<'a> {
    pub fn new(graph: &'a ProjectGraph, toolchain: &'a Toolchain) -> Self {
        Self { graph, toolchain }
    }

    /// Locate the outputs of every mapped project for the request.
    pub fn collect(&self, request: &BuildRequest) -> ArtifactManifest {
        let solution_config = request.solution_config();
        let mut manifest = ArtifactManifest::default();

        for node in self.graph.nodes() {
            let Some(config) = node.config_for(&solution_config) else {
                continue;
            };

            let output_dir = config.output_path.as_deref().map(|declared| {
                let substituted = substitute_tokens(
                    declared,
                    &config.configuration,
                    &config.platform,
                );
                node.path
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(substituted)
            });

            let mut artifacts = ProjectArtifacts::default();

            if node.is_uitest() {
                if let Some(dir) = &output_dir {
                    if let Some(assembly) =
                        find_artifact(dir, ".dll", Some(&format!("{}.dll", node.assembly_name)))
                    {
                        artifacts.uitest_assemblies.push(assembly);
                    }
                }
            } else {
                match node.api {
                    Api::Ios | Api::TvOs => {
                        if is_archiveable(&config.mtouch_archs) {
                            artifacts.xcarchive = self.latest_archive(&node.assembly_name);
                        }
                        if let Some(dir) = &output_dir {
                            artifacts.app = find_artifact(
                                dir,
                                ".app",
                                Some(&format!("{}.app", node.assembly_name)),
                            );
                        }
                    }
                    Api::Mac => {
                        artifacts.xcarchive = self.latest_archive(&node.assembly_name);
                        if let Some(dir) = &output_dir {
                            artifacts.app = find_artifact(
                                dir,
                                ".app",
                                Some(&format!("{}.app", node.assembly_name)),
                            );
                        }
                    }
                    Api::Android => {
                        if let Some(dir) = &output_dir {
                            artifacts.apk = find_apk(dir, &node.assembly_name, config.sign_package);
                        }
                    }
                    Api::Unknown => {}
                }
            }

            if artifacts.is_empty() {
                debug!(project = %node.name, "no artifact located, omitting from manifest");
            } else {
                manifest.projects.insert(node.id.clone(), artifacts);
            }
        }

        manifest
    }

    /// Most recent archive bundle for an assembly under the archives
    /// directory, ordered by date folder, embedded timestamp, and duplicate
    /// index.
    fn latest_archive(&self, assembly_name: &str) -> Option<PathBuf> {
        latest_archive_in(&self.toolchain.archives_dir, assembly_name)
    }
}

/// Substitute build-axis tokens in a declared output path.
fn substitute_tokens(declared: &str, configuration: &str, platform: &str) -> String {
    declared
        .replace("$(Configuration)", configuration)
        .replace("$(Platform)", platform)
}

/// First directory entry with the extension, preferring an exact name.
///
/// Ties beyond the preferred name are resolved by name order; multiple
/// matches are not an error.
fn find_artifact(dir: &Path, extension: &str, preferred: Option<&str>) -> Option<PathBuf> {
    let entries = entries_with_suffix(dir, extension);
    if let Some(preferred) = preferred {
        if let Some(exact) = entries
            .iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(preferred))
        {
            return Some(exact.clone());
        }
    }
    entries.into_iter().next()
}

/// Package lookup with signed-variant preference.
fn find_apk(dir: &Path, assembly_name: &str, signed_requested: bool) -> Option<PathBuf> {
    let entries = entries_with_suffix(dir, ".apk");
    if signed_requested {
        let prefix = assembly_name.to_lowercase();
        if let Some(signed) = entries.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(str::to_lowercase)
                .is_some_and(|n| n.starts_with(&prefix) && n.contains("signed"))
        }) {
            return Some(signed.clone());
        }
    }
    find_artifact(dir, ".apk", Some(&format!("{assembly_name}.apk")))
}

fn entries_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<PathBuf> = read
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix))
        })
        .collect();
    entries.sort();
    entries
}

fn latest_archive_in(archives_dir: &Path, assembly_name: &str) -> Option<PathBuf> {
    let mut best: Option<(NaiveDate, NaiveDateTime, u32, PathBuf)> = None;

    for day_dir in std::fs::read_dir(archives_dir).ok()?.filter_map(|e| e.ok()) {
        let day_name = day_dir.file_name();
        let Some(day) = day_name
            .to_str()
            .and_then(|n| NaiveDate::parse_from_str(n, ARCHIVE_DIR_DATE).ok())
        else {
            continue;
        };

        let Ok(bundles) = std::fs::read_dir(day_dir.path()) else {
            continue;
        };
        for bundle in bundles.filter_map(|e| e.ok()) {
            let file_name = bundle.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(caps) = ARCHIVE_NAME.captures(name) else {
                continue;
            };
            if &caps["name"] != assembly_name {
                continue;
            }
            let Ok(timestamp) = NaiveDateTime::parse_from_str(&caps["ts"], ARCHIVE_TIMESTAMP)
            else {
                continue;
            };
            let index: u32 = caps
                .name("idx")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);

            let key = (day, timestamp, index, bundle.path());
            if best.as_ref().is_none_or(|b| {
                (key.0, key.1, key.2) > (b.0, b.1, b.2)
            }) {
                best = Some(key);
            }
        }
    }

    best.map(|(_, _, _, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx_descriptor::{OutputType, TestKind};
    use mx_graph::{ProjectConfig, ProjectNode};
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;

    fn make_node(id: &str, name: &str, api: Api, dir: &Path, output_path: &str) -> ProjectNode {
        let mut mappings = BTreeMap::new();
        mappings.insert("Release|iPhone".to_string(), "Release|iPhone".to_string());
        let mut configs = BTreeMap::new();
        configs.insert(
            "Release|iPhone".to_string(),
            ProjectConfig {
                configuration: String::from("Release"),
                platform: String::from("iPhone"),
                output_path: Some(output_path.to_string()),
                ..ProjectConfig::default()
            },
        );
        ProjectNode {
            id: id.to_string(),
            name: name.to_string(),
            path: dir.join(name).join(format!("{name}.csproj")),
            api,
            test_kinds: BTreeSet::new(),
            output_type: OutputType::Exe,
            assembly_name: name.to_string(),
            android_application: api == Api::Android,
            referenced_ids: BTreeSet::new(),
            mappings,
            configs,
            uitest_projects: Vec::new(),
        }
    }

    fn make_graph(dir: &Path, nodes: Vec<ProjectNode>) -> ProjectGraph {
        ProjectGraph {
            path: dir.join("Sample.sln"),
            name: String::from("Sample"),
            configs: vec![String::from("Release|iPhone")],
            projects: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        }
    }

    fn request() -> BuildRequest {
        BuildRequest::new("Release", "iPhone")
    }

    #[test]
    fn locates_an_app_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("App/bin/iPhone/Release");
        fs::create_dir_all(out.join("App.app")).unwrap();

        let mut node = make_node("A", "App", Api::Ios, dir.path(), "bin/iPhone/Release");
        // Simulator architecture: no archive lookup.
        node.configs.get_mut("Release|iPhone").unwrap().mtouch_archs = vec!["i386".into()];
        let graph = make_graph(dir.path(), vec![node]);
        let toolchain = Toolchain::default();

        let manifest = Collector::new(&graph, &toolchain).collect(&request());
        let artifacts = manifest.get("A").unwrap();
        assert_eq!(artifacts.app.as_deref(), Some(out.join("App.app").as_path()));
        assert!(artifacts.xcarchive.is_none());
    }

    #[test]
    fn substitutes_build_axis_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("App/bin/iPhone/Release");
        fs::create_dir_all(out.join("App.app")).unwrap();

        let mut node = make_node(
            "A",
            "App",
            Api::Ios,
            dir.path(),
            "bin/$(Platform)/$(Configuration)",
        );
        node.configs.get_mut("Release|iPhone").unwrap().mtouch_archs = vec!["i386".into()];
        let graph = make_graph(dir.path(), vec![node]);
        let toolchain = Toolchain::default();

        let manifest = Collector::new(&graph, &toolchain).collect(&request());
        assert!(manifest.get("A").unwrap().app.is_some());
    }

    #[test]
    fn absence_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // Library project with an empty output directory: no artifact, no
        // manifest entry, no failure.
        let out = dir.path().join("Lib/bin/iPhone/Release");
        fs::create_dir_all(&out).unwrap();

        let mut node = make_node("L", "Lib", Api::Ios, dir.path(), "bin/iPhone/Release");
        node.output_type = OutputType::Library;
        node.configs.get_mut("Release|iPhone").unwrap().mtouch_archs = vec!["i386".into()];
        let graph = make_graph(dir.path(), vec![node]);
        let toolchain = Toolchain::default();

        let manifest = Collector::new(&graph, &toolchain).collect(&request());
        assert!(manifest.get("L").is_none());
        assert!(manifest.is_empty());
    }

    #[test]
    fn prefers_the_signed_package_when_signing_was_requested() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Droid/bin/Release");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("Droid.apk"), b"apk").unwrap();
        fs::write(out.join("Droid-Signed.apk"), b"apk").unwrap();

        let mut node = make_node("D", "Droid", Api::Android, dir.path(), "bin/Release");
        node.configs.get_mut("Release|iPhone").unwrap().sign_package = true;
        let graph = make_graph(dir.path(), vec![node]);
        let toolchain = Toolchain::default();

        let manifest = Collector::new(&graph, &toolchain).collect(&request());
        let apk = manifest.get("D").unwrap().apk.as_ref().unwrap();
        assert!(apk.to_string_lossy().ends_with("Droid-Signed.apk"));
    }

    #[test]
    fn collects_uitest_assemblies() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("UITests/bin/Release");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("UITests.dll"), b"dll").unwrap();

        let mut node = make_node("T", "UITests", Api::Unknown, dir.path(), "bin/Release");
        node.test_kinds.insert(TestKind::UiTest);
        node.output_type = OutputType::Library;
        let graph = make_graph(dir.path(), vec![node]);
        let toolchain = Toolchain::default();

        let manifest = Collector::new(&graph, &toolchain).collect(&request());
        assert_eq!(manifest.get("T").unwrap().uitest_assemblies.len(), 1);
    }

    #[test]
    fn latest_archive_prefers_the_newer_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let archives = dir.path().join("Archives");
        let day1 = archives.join("2016-10-07");
        let day2 = archives.join("2016-10-09");
        fs::create_dir_all(day1.join("App.iOS 10-07-16 3.41 PM.xcarchive")).unwrap();
        fs::create_dir_all(day2.join("App.iOS 10-09-16 1.05 PM.xcarchive")).unwrap();
        fs::create_dir_all(day2.join("App.iOS 10-09-16 1.05 PM 2.xcarchive")).unwrap();
        fs::create_dir_all(day2.join("Other.iOS 10-09-16 4.00 PM.xcarchive")).unwrap();

        let latest = latest_archive_in(&archives, "App.iOS").unwrap();
        assert!(latest
            .to_string_lossy()
            .ends_with("App.iOS 10-09-16 1.05 PM 2.xcarchive"));
    }

    #[test]
    fn archive_lookup_without_a_directory_is_none() {
        assert!(latest_archive_in(Path::new("/nonexistent/archives"), "App").is_none());
    }
}
