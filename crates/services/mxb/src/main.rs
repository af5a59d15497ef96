//! MX Builder (mxb)
//!
//! Drives automated building, packaging, deployment-to-simulator, and test
//! execution for multi-project mobile application solutions. The builder can
//! run in different modes:
//!
//! - **Parse**: Resolve a solution into its project graph and display it
//! - **Build**: Generate and execute the ordered build commands for the
//!   application projects of a solution, then report the located artifacts
//! - **Uitest**: Build UI test projects and the applications they exercise,
//!   deploy onto a simulator device, and run the external test harness
//!
//! All external tool locations and deadlines come from an optional TOML
//! configuration file; conventional defaults apply when it is absent.

mod cli;
mod commands;
mod error;
mod prelude;
mod results;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{handle_build, handle_parse, handle_uitest};
use crate::prelude::*;
use mx_config::MxConfig;

/// Main entry point for the MX Builder.
///
/// Initializes logging, parses command line arguments, loads the toolchain
/// configuration, and dispatches to the appropriate command handler.
///
/// # Examples
///
/// ```bash
/// # Inspect the resolved project graph
/// mxb parse --solution Sample.sln
///
/// # Build the iOS application projects
/// mxb build --solution Sample.sln --configuration Release --platform iPhone --api ios
///
/// # Build, deploy, and run the UI tests on a simulator
/// mxb uitest --solution Sample.sln --configuration Release --platform iPhoneSimulator \
///     --device "iPhone 6" --os-version latest
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mxb=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MxConfig::from_file(path)?,
        None => MxConfig::default(),
    };

    match cli.command {
        Commands::Parse { solution } => handle_parse(&solution),
        Commands::Build {
            solution,
            configuration,
            platform,
            api,
            project_id,
        } => {
            handle_build(
                &config,
                &solution,
                &configuration,
                &platform,
                &api,
                project_id.as_deref(),
            )
            .await
        }
        Commands::Uitest {
            solution,
            configuration,
            platform,
            device,
            os_version,
            test_to_run,
            results_path,
        } => {
            handle_uitest(
                &config,
                &solution,
                &configuration,
                &platform,
                &device,
                &os_version,
                test_to_run.as_deref(),
                &results_path,
            )
            .await
        }
    }
}
