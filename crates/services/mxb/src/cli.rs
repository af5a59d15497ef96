//! Command-line interface for the MX Builder.
//!
//! Defines the CLI structure and commands for mxb.

use clap::{Parser, Subcommand, ValueEnum};
use mx_descriptor::Api;
use std::path::PathBuf;

/// Command-line interface for the MX Builder.
#[derive(Parser)]
#[command(name = "mxb")]
#[command(about = "MX Builder - resolve, build, and test multi-project mobile solutions")]
pub struct Cli {
    /// Path to the toolchain configuration file (defaults apply when absent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target API selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApiArg {
    Ios,
    Android,
    Mac,
    Tvos,
}

impl From<ApiArg> for Api {
    fn from(value: ApiArg) -> Self {
        match value {
            ApiArg::Ios => Api::Ios,
            ApiArg::Android => Api::Android,
            ApiArg::Mac => Api::Mac,
            ApiArg::Tvos => Api::TvOs,
        }
    }
}

/// Available commands for the MX Builder.
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a solution and display its project graph
    Parse {
        /// Solution file path
        #[arg(short, long)]
        solution: PathBuf,
    },

    /// Build the application projects of a solution
    Build {
        /// Solution file path
        #[arg(short, long)]
        solution: PathBuf,

        /// Build configuration (e.g. Release)
        #[arg(short, long)]
        configuration: String,

        /// Build platform (e.g. iPhone)
        #[arg(short, long)]
        platform: String,

        /// Restrict to these APIs (repeatable; all when omitted)
        #[arg(short, long)]
        api: Vec<ApiArg>,

        /// Restrict to a single project id
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Build UI test projects, deploy to a simulator, and run the harness
    Uitest {
        /// Solution file path
        #[arg(short, long)]
        solution: PathBuf,

        /// Build configuration (e.g. Release)
        #[arg(short, long)]
        configuration: String,

        /// Build platform; forced to the simulator platform when needed
        #[arg(short, long)]
        platform: String,

        /// Simulator device name (e.g. "iPhone 6")
        #[arg(short, long)]
        device: String,

        /// Simulator OS version (e.g. "iOS 10.1", or "latest")
        #[arg(short, long, default_value = "latest")]
        os_version: String,

        /// Restrict the harness to a single test
        #[arg(long)]
        test_to_run: Option<String>,

        /// Path where the harness writes its XML result file
        #[arg(long, default_value = "TestResult.xml")]
        results_path: PathBuf,
    },
}
