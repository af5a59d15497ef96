//! Ordered build command generation.
//!
//! Walks the resolved graph for one requested configuration/platform pair.
//! Application projects map to build/archive/package commands per API; UI
//! test projects first pull in the commands of every referenced application
//! that matches the filter, so the application under test is always built
//! before the test assembly. Failures to generate for a test project are
//! collected, not raised, so partial success across test projects stays
//! visible.

use std::collections::BTreeSet;

use mx_config::Toolchain;
use mx_descriptor::Api;
use mx_graph::{ProjectGraph, ProjectNode, normalize_platform, to_config};
use tracing::debug;

use crate::command::{BuildCommand, CommandKind};
use crate::mdtool::SolutionToolCommand;
use crate::msbuild::MsBuildCommand;

/// One requested build, as a typed parameter object.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub configuration: String,
    pub platform: String,
    /// APIs to build; empty allows every known API.
    pub api_filter: BTreeSet<Api>,
    /// Optional restriction to specific project ids.
    pub id_filter: Option<BTreeSet<String>>,
}

impl BuildRequest {
    pub fn new(configuration: &str, platform: &str) -> Self {
        Self {
            configuration: configuration.to_string(),
            platform: platform.to_string(),
            api_filter: BTreeSet::new(),
            id_filter: None,
        }
    }

    pub fn with_apis(mut self, apis: impl IntoIterator<Item = Api>) -> Self {
        self.api_filter = apis.into_iter().collect();
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.id_filter = Some(ids.into_iter().map(|id| id.to_uppercase()).collect());
        self
    }

    /// Solution-side pair key for this request.
    pub fn solution_config(&self) -> String {
        to_config(&self.configuration, &normalize_platform(&self.platform))
    }

    fn allows_api(&self, api: Api) -> bool {
        if api == Api::Unknown {
            return false;
        }
        self.api_filter.is_empty() || self.api_filter.contains(&api)
    }

    fn allows_id(&self, id: &str) -> bool {
        match &self.id_filter {
            Some(ids) => ids.contains(&id.to_uppercase()),
            None => true,
        }
    }
}

/// A command-generation failure for one project, collected rather than
/// raised so other projects can still produce commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    pub project: String,
    pub reason: String,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.project, self.reason)
    }
}

/// Ordered commands plus whatever failed to generate.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCommands {
    pub commands: Vec<BuildCommand>,
    pub errors: Vec<GenerationError>,
}

/// Command generator over one resolved graph.
pub struct Generator<'a> {
    graph: &'a ProjectGraph,
    toolchain: &'a Toolchain,
}

impl<'a> Generator<'a> {
    pub fn new(graph: &'a ProjectGraph, toolchain: &'a Toolchain) -> Self {
        Self { graph, toolchain }
    }

    /// Commands for every application project matching the request.
    ///
    /// Falls back to a single whole-solution build when nothing matches, so
    /// shared-library-only solutions still build meaningfully.
    pub fn commands_for(&self, request: &BuildRequest) -> GeneratedCommands {
        let mut generated = GeneratedCommands::default();

        for node in self.graph.applications() {
            if !request.allows_api(node.api) || !request.allows_id(&node.id) {
                continue;
            }
            match self.project_commands(node, request) {
                Some(commands) => generated.commands.extend(commands),
                None => {
                    debug!(project = %node.name, config = %request.solution_config(),
                        "project has no mapping for the requested configuration, skipping");
                }
            }
        }

        if generated.commands.is_empty() {
            debug!("no matching application project, falling back to a whole-solution build");
            generated.commands.push(self.solution_command(request));
        }

        generated
    }

    /// Commands for every UI test project matching the request, each
    /// preceded by the commands of its referenced applications.
    pub fn test_build_commands(&self, request: &BuildRequest) -> GeneratedCommands {
        let mut generated = GeneratedCommands::default();
        let solution_config = request.solution_config();
        // Guards against shared references and accidental cycles: each
        // project's commands are emitted at most once per call.
        let mut visited: BTreeSet<String> = BTreeSet::new();

        for test in self.graph.uitests() {
            if !request.allows_id(&test.id) {
                continue;
            }

            let Some(test_config) = test.config_for(&solution_config) else {
                generated.errors.push(GenerationError {
                    project: test.name.clone(),
                    reason: format!("no configuration mapped for {solution_config}"),
                });
                continue;
            };

            let mut referred_commands = Vec::new();
            let mut qualifying = 0usize;

            for referenced_id in &test.referenced_ids {
                let Some(referenced) = self.graph.get(referenced_id) else {
                    debug!(project = %test.name, referenced_id,
                        "referenced project not present in the graph");
                    continue;
                };
                if !referenced.is_application() || !request.allows_api(referenced.api) {
                    continue;
                }
                qualifying += 1;
                if visited.insert(referenced.id.clone()) {
                    if let Some(commands) = self.project_commands(referenced, request) {
                        referred_commands.extend(commands);
                    }
                }
            }

            if qualifying == 0 {
                generated.errors.push(GenerationError {
                    project: test.name.clone(),
                    reason: String::from(
                        "no referenced application project matches the requested filter",
                    ),
                });
                continue;
            }

            generated.commands.extend(referred_commands);

            if visited.insert(test.id.clone()) {
                // The test assembly builds with its configuration only; the
                // tool rejects a platform pair for test projects.
                generated.commands.push(
                    SolutionToolCommand::new(&self.toolchain.solution_tool, &self.graph.path)
                        .target("build")
                        .configuration(&test_config.configuration)
                        .project_name(&test.name)
                        .into_command(CommandKind::Build, Some(test.id.clone())),
                );
            }
        }

        generated
    }

    /// The whole-solution build command for the requested pair.
    pub fn solution_command(&self, request: &BuildRequest) -> BuildCommand {
        SolutionToolCommand::new(&self.toolchain.solution_tool, &self.graph.path)
            .target("build")
            .configuration(&request.configuration)
            .platform(&normalize_platform(&request.platform))
            .into_command(CommandKind::Build, None)
    }

    /// Commands for one application project, or `None` when the project has
    /// no configuration mapped for the request.
    fn project_commands(
        &self,
        node: &ProjectNode,
        request: &BuildRequest,
    ) -> Option<Vec<BuildCommand>> {
        let config = node.config_for(&request.solution_config())?;
        let mut commands = Vec::new();

        match node.api {
            Api::Ios | Api::TvOs => {
                commands.push(
                    SolutionToolCommand::new(&self.toolchain.solution_tool, &self.graph.path)
                        .target("build")
                        .configuration(&config.configuration)
                        .platform(&config.platform)
                        .project_name(&node.name)
                        .into_command(CommandKind::Build, Some(node.id.clone())),
                );
                if is_archiveable(&config.mtouch_archs) {
                    commands.push(
                        SolutionToolCommand::new(&self.toolchain.solution_tool, &self.graph.path)
                            .target("archive")
                            .configuration(&config.configuration)
                            .platform(&config.platform)
                            .project_name(&node.name)
                            .into_command(CommandKind::Archive, Some(node.id.clone())),
                    );
                }
            }
            Api::Mac => {
                for (target, kind) in [("build", CommandKind::Build), ("archive", CommandKind::Archive)] {
                    commands.push(
                        SolutionToolCommand::new(&self.toolchain.solution_tool, &self.graph.path)
                            .target(target)
                            .configuration(&config.configuration)
                            .platform(&config.platform)
                            .project_name(&node.name)
                            .into_command(kind, Some(node.id.clone())),
                    );
                }
            }
            Api::Android => {
                // Signing and plain packaging are mutually exclusive targets.
                let target = if config.sign_package {
                    "SignAndroidPackage"
                } else {
                    "PackageForAndroid"
                };
                commands.push(
                    MsBuildCommand::new(&self.toolchain.msbuild, &node.path)
                        .target(target)
                        .configuration(&config.configuration)
                        .platform(&config.platform)
                        .into_command(CommandKind::Package, Some(node.id.clone())),
                );
            }
            Api::Unknown => {}
        }

        Some(commands)
    }
}

/// Whether a declared architecture list calls for an archive step.
///
/// The historical default target is a physical-device architecture, so an
/// absent or empty list archives; any non-ARM entry opts out.
pub fn is_archiveable(architectures: &[String]) -> bool {
    architectures
        .iter()
        .all(|arch| arch.to_lowercase().starts_with("arm"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ToolKind;
    use mx_descriptor::{OutputType, TestKind};
    use mx_graph::{ProjectConfig, ProjectNode};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn toolchain() -> Toolchain {
        Toolchain {
            solution_tool: PathBuf::from("/opt/mdtool"),
            msbuild: PathBuf::from("/opt/xbuild"),
            ..Toolchain::default()
        }
    }

    fn node(id: &str, name: &str, api: Api) -> ProjectNode {
        ProjectNode {
            id: id.to_string(),
            name: name.to_string(),
            path: PathBuf::from(format!("/w/{name}/{name}.csproj")),
            api,
            test_kinds: BTreeSet::new(),
            output_type: OutputType::Exe,
            assembly_name: name.to_string(),
            android_application: false,
            referenced_ids: BTreeSet::new(),
            mappings: BTreeMap::new(),
            configs: BTreeMap::new(),
            uitest_projects: Vec::new(),
        }
    }

    fn with_config(mut node: ProjectNode, solution: &str, project: &str, config: ProjectConfig) -> ProjectNode {
        node.mappings.insert(solution.to_string(), project.to_string());
        node.configs.insert(project.to_string(), config);
        node
    }

    fn iphone_config(archs: &[&str]) -> ProjectConfig {
        ProjectConfig {
            configuration: String::from("Release"),
            platform: String::from("iPhone"),
            output_path: Some(String::from("bin/iPhone/Release")),
            mtouch_archs: archs.iter().map(|a| a.to_string()).collect(),
            sign_package: false,
            build_ipa: false,
        }
    }

    fn graph(nodes: Vec<ProjectNode>) -> ProjectGraph {
        ProjectGraph {
            path: PathBuf::from("/w/Sample.sln"),
            name: String::from("Sample"),
            configs: vec![String::from("Release|iPhone")],
            projects: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        }
    }

    fn request() -> BuildRequest {
        BuildRequest::new("Release", "iPhone").with_apis([Api::Ios])
    }

    #[test]
    fn archive_inference() {
        assert!(is_archiveable(&["armv7".into(), "arm64".into()]));
        assert!(!is_archiveable(&["x86".into()]));
        assert!(is_archiveable(&[]));
    }

    #[test]
    fn ios_application_builds_and_archives() {
        let app = with_config(
            node("A", "Sample.iOS", Api::Ios),
            "Release|iPhone",
            "Release|iPhone",
            iphone_config(&["ARMv7"]),
        );
        let toolchain = toolchain();
        let graph = graph(vec![app]);

        let generated = Generator::new(&graph, &toolchain).commands_for(&request());
        assert!(generated.errors.is_empty());
        assert_eq!(generated.commands.len(), 2);
        assert_eq!(
            generated.commands[0].args,
            vec!["build", "-c:Release|iPhone", "/w/Sample.sln", "-p:Sample.iOS"]
        );
        assert_eq!(
            generated.commands[1].args,
            vec!["archive", "-c:Release|iPhone", "/w/Sample.sln", "-p:Sample.iOS"]
        );
    }

    #[test]
    fn simulator_architecture_skips_the_archive() {
        let app = with_config(
            node("A", "Sample.iOS", Api::Ios),
            "Release|iPhone",
            "Release|iPhone",
            iphone_config(&["i386"]),
        );
        let toolchain = toolchain();
        let graph = graph(vec![app]);

        let generated = Generator::new(&graph, &toolchain).commands_for(&request());
        assert_eq!(generated.commands.len(), 1);
        assert_eq!(generated.commands[0].kind, CommandKind::Build);
    }

    #[test]
    fn android_signing_and_packaging_are_mutually_exclusive() {
        let mut signed = with_config(
            node("A", "Sample.Droid", Api::Android),
            "Release|AnyCPU",
            "Release|AnyCPU",
            ProjectConfig {
                configuration: String::from("Release"),
                platform: String::from("AnyCPU"),
                sign_package: true,
                ..ProjectConfig::default()
            },
        );
        signed.android_application = true;

        let toolchain = toolchain();
        let graph = graph(vec![signed]);
        let request = BuildRequest::new("Release", "Any CPU").with_apis([Api::Android]);

        let generated = Generator::new(&graph, &toolchain).commands_for(&request);
        assert_eq!(generated.commands.len(), 1);
        let command = &generated.commands[0];
        assert_eq!(command.tool, ToolKind::MsBuild);
        assert!(command.args.contains(&"/t:SignAndroidPackage".to_string()));
        assert!(!command.args.iter().any(|a| a == "/t:PackageForAndroid"));
        // AnyCPU never becomes a platform property.
        assert!(!command.args.iter().any(|a| a.starts_with("/p:Platform")));
    }

    #[test]
    fn falls_back_to_a_whole_solution_build() {
        let toolchain = toolchain();
        let graph = graph(vec![]);

        let generated = Generator::new(&graph, &toolchain).commands_for(&request());
        assert_eq!(generated.commands.len(), 1);
        let command = &generated.commands[0];
        assert_eq!(command.project_id, None);
        assert_eq!(command.args, vec!["build", "-c:Release|iPhone", "/w/Sample.sln"]);
    }

    fn uitest_node(id: &str, name: &str, referenced: &[&str]) -> ProjectNode {
        let mut test = node(id, name, Api::Unknown);
        test.output_type = OutputType::Library;
        test.test_kinds.insert(TestKind::UiTest);
        test.referenced_ids = referenced.iter().map(|r| r.to_string()).collect();
        with_config(
            test,
            "Release|iPhone",
            "Release|AnyCPU",
            ProjectConfig {
                configuration: String::from("Release"),
                platform: String::from("AnyCPU"),
                output_path: Some(String::from("bin/Release")),
                ..ProjectConfig::default()
            },
        )
    }

    #[test]
    fn test_commands_order_the_application_first() {
        // The test project id sorts before the application id, so graph
        // iteration order alone would put the test first; the generator must
        // still emit the application's commands at lower indices.
        let app = with_config(
            node("ZZ-APP", "Sample.iOS", Api::Ios),
            "Release|iPhone",
            "Release|iPhone",
            iphone_config(&["ARMv7"]),
        );
        let test = uitest_node("AA-TEST", "Sample.UITests", &["ZZ-APP"]);

        let toolchain = toolchain();
        let graph = graph(vec![app, test]);

        let generated = Generator::new(&graph, &toolchain).test_build_commands(&request());
        assert!(generated.errors.is_empty());
        assert_eq!(generated.commands.len(), 3);

        let app_build = generated
            .commands
            .iter()
            .position(|c| c.project_id.as_deref() == Some("ZZ-APP") && c.kind == CommandKind::Build)
            .expect("application build emitted");
        let app_archive = generated
            .commands
            .iter()
            .position(|c| c.kind == CommandKind::Archive)
            .expect("application archive emitted");
        let test_build = generated
            .commands
            .iter()
            .position(|c| c.project_id.as_deref() == Some("AA-TEST"))
            .expect("test build emitted");

        assert!(app_build < test_build);
        assert!(app_archive < test_build);
        assert_eq!(
            generated.commands[test_build].args,
            vec!["build", "-c:Release", "/w/Sample.sln", "-p:Sample.UITests"]
        );
    }

    #[test]
    fn unmatched_test_project_collects_an_error() {
        // The only referenced project is Android while the filter asks for
        // iOS: generation fails for the test project but nothing is raised.
        let mut droid = with_config(
            node("DD-APP", "Sample.Droid", Api::Android),
            "Release|iPhone",
            "Release|AnyCPU",
            ProjectConfig {
                configuration: String::from("Release"),
                platform: String::from("AnyCPU"),
                ..ProjectConfig::default()
            },
        );
        droid.android_application = true;
        let test = uitest_node("TT-TEST", "Sample.UITests", &["DD-APP"]);

        let toolchain = toolchain();
        let graph = graph(vec![droid, test]);

        let generated = Generator::new(&graph, &toolchain).test_build_commands(&request());
        assert!(generated.commands.is_empty());
        assert_eq!(generated.errors.len(), 1);
        assert_eq!(generated.errors[0].project, "Sample.UITests");
    }

    #[test]
    fn shared_application_is_emitted_once() {
        let app = with_config(
            node("APP", "Sample.iOS", Api::Ios),
            "Release|iPhone",
            "Release|iPhone",
            iphone_config(&["ARMv7"]),
        );
        let test_a = uitest_node("TEST-A", "Smoke.UITests", &["APP"]);
        let test_b = uitest_node("TEST-B", "Full.UITests", &["APP"]);

        let toolchain = toolchain();
        let graph = graph(vec![app, test_a, test_b]);

        let generated = Generator::new(&graph, &toolchain).test_build_commands(&request());
        assert!(generated.errors.is_empty());
        let app_builds = generated
            .commands
            .iter()
            .filter(|c| c.project_id.as_deref() == Some("APP"))
            .count();
        assert_eq!(app_builds, 2, "build + archive, once despite two tests");
        assert_eq!(generated.commands.len(), 4);
    }
}
