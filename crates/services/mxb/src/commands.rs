//! Command handlers for the MX Builder.
//!
//! Contains handler functions for the CLI commands: graph inspection,
//! application builds, and the UI-test build/deploy/run sequence. Commands
//! execute strictly in the order the generator produced them; a build
//! failure aborts the remaining sequence.

use std::path::Path;

use mx_build::{BuildRequest, Collector, GeneratedCommands, Generator};
use mx_config::MxConfig;
use mx_descriptor::Api;
use mx_io::Executor;
use mx_sim::DeviceManager;
use tracing::{error, info, warn};

use crate::cli::ApiArg;
use crate::prelude::*;
use crate::results;

/// Platform UI tests deploy against.
const SIMULATOR_PLATFORM: &str = "iPhoneSimulator";

/// Handles the parse command to display the resolved project graph.
pub fn handle_parse(solution: &Path) -> Result<()> {
    let graph = mx_graph::resolve(solution)?;

    println!("Solution: {}", graph.name);
    println!("Configurations: {}", graph.configs.join(", "));
    println!("Projects: {}", graph.projects.len());

    for node in graph.nodes() {
        println!("\n{} ({})", node.name, node.id);
        println!("  api: {}", node.api);
        println!("  assembly: {}", node.assembly_name);
        if node.is_uitest() {
            println!("  role: ui test");
        } else if node.is_application() {
            println!("  role: application");
        } else {
            println!("  role: library");
        }
        for (solution_config, project_config) in &node.mappings {
            println!("  {solution_config} -> {project_config}");
        }
    }

    Ok(())
}

/// Handles the build command: generate, execute, collect, report.
pub async fn handle_build(
    config: &MxConfig,
    solution: &Path,
    configuration: &str,
    platform: &str,
    apis: &[ApiArg],
    project_id: Option<&str>,
) -> Result<()> {
    let graph = mx_graph::resolve(solution)?;

    let mut request = BuildRequest::new(configuration, platform)
        .with_apis(apis.iter().map(|a| Api::from(*a)));
    if let Some(id) = project_id {
        request = request.with_ids([id.to_string()]);
    }
    if !graph.has_config(&request.solution_config()) {
        warn!(
            "solution does not declare {}; available: {}",
            request.solution_config(),
            graph.configs.join(", ")
        );
    }

    let generator = Generator::new(&graph, &config.toolchain);
    let generated = generator.commands_for(&request);
    execute_all(config, &generated).await?;

    let manifest = Collector::new(&graph, &config.toolchain).collect(&request);
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

/// Handles the uitest command: build test and referred projects, deploy the
/// application to the simulator, run the harness, and surface failures.
#[allow(clippy::too_many_arguments)]
pub async fn handle_uitest(
    config: &MxConfig,
    solution: &Path,
    configuration: &str,
    platform: &str,
    device_name: &str,
    os_version: &str,
    test_to_run: Option<&str>,
    results_path: &Path,
) -> Result<()> {
    let platform = if platform == SIMULATOR_PLATFORM {
        platform.to_string()
    } else {
        warn!("platform '{platform}' cannot host UI tests, switching to '{SIMULATOR_PLATFORM}'");
        SIMULATOR_PLATFORM.to_string()
    };

    let graph = mx_graph::resolve(solution)?;
    let request = BuildRequest::new(configuration, &platform).with_apis([Api::Ios]);

    let generator = Generator::new(&graph, &config.toolchain);
    let generated = generator.test_build_commands(&request);
    if generated.commands.is_empty() {
        let reasons = generated
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::NoTestCommands(reasons));
    }
    execute_all(config, &generated).await?;

    let manifest = Collector::new(&graph, &config.toolchain).collect(&request);

    let manager = DeviceManager::new(config.toolchain.clone(), config.device.clone());
    let device = manager.discover(device_name, os_version).await?;

    let executor = Executor::new(config.watchdog.clone());

    for test in graph.uitests() {
        let Some(assemblies) = manifest
            .get(&test.id)
            .map(|a| a.uitest_assemblies.clone())
            .filter(|a| !a.is_empty())
        else {
            warn!("no test assembly located for {}, skipping", test.name);
            continue;
        };

        for referenced_id in &test.referenced_ids {
            let Some(app_node) = graph.get(referenced_id) else {
                continue;
            };
            if !app_node.is_application() {
                continue;
            }
            let app_path = manifest
                .get(referenced_id)
                .and_then(|a| a.app.clone())
                .ok_or_else(|| Error::ArtifactNotFound(app_node.name.clone()))?;

            info!("deploying {} to {}", app_path.display(), device.name);
            manager.prepare(&device, &app_path).await?;

            for assembly in &assemblies {
                info!("testing {} against {}", test.name, app_node.name);
                run_harness(
                    config,
                    &executor,
                    assembly,
                    &app_path,
                    test_to_run,
                    results_path,
                )
                .await?;
            }
        }
    }

    Ok(())
}

/// Execute generated commands in order, supervised where the command
/// targets the interactive tool. Collected generation errors are reported
/// but do not block the commands that did generate.
async fn execute_all(config: &MxConfig, generated: &GeneratedCommands) -> Result<()> {
    for error in &generated.errors {
        warn!("{error}");
    }

    let executor = Executor::new(config.watchdog.clone());
    for command in &generated.commands {
        if command.is_supervised() {
            executor.execute_supervised(&command.program, &command.args).await?;
        } else {
            executor.execute(&command.program, &command.args).await?;
        }
    }
    Ok(())
}

/// Run the external test harness for one test assembly, with the deployed
/// application path exported in the harness environment. On failure the
/// result file's failure subtrees are surfaced before the error propagates.
async fn run_harness(
    config: &MxConfig,
    executor: &Executor,
    assembly: &Path,
    app_path: &Path,
    test_to_run: Option<&str>,
    results_path: &Path,
) -> Result<()> {
    let mut args = vec![
        config.toolchain.test_harness.display().to_string(),
        assembly.display().to_string(),
        format!("--result={}", results_path.display()),
    ];
    if let Some(test) = test_to_run {
        args.push(format!("--test={test}"));
    }
    let envs = [(
        String::from("APP_BUNDLE_PATH"),
        app_path.display().to_string(),
    )];

    let run = executor
        .execute_env(&config.toolchain.runtime, &args, &envs)
        .await;

    if run.is_err() {
        match std::fs::read_to_string(results_path) {
            Ok(content) => {
                for failure in results::parse_failures(&content) {
                    error!("failed: {}", failure.name);
                    if !failure.message.is_empty() {
                        error!("{}", failure.message);
                    }
                    if !failure.stack_trace.is_empty() {
                        error!("{}", failure.stack_trace);
                    }
                }
            }
            Err(err) => warn!("failed to read test results at {}: {err}", results_path.display()),
        }
        return Err(Error::TestRunFailed);
    }

    Ok(())
}
