//! Build command model.

use std::path::PathBuf;

use serde::Serialize;

/// Which external tool a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToolKind {
    /// Interactive solution build tool; runs under the hang watchdog.
    SolutionTool,
    /// Batch MSBuild-style build tool.
    MsBuild,
}

/// Which logical step of a project build a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    Build,
    Archive,
    Package,
}

/// One shell-invocable external build-tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildCommand {
    pub tool: ToolKind,
    pub kind: CommandKind,
    /// Id of the project this command builds; `None` for whole-solution
    /// fallback builds.
    pub project_id: Option<String>,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl BuildCommand {
    /// Whether execution must run under the hang watchdog.
    pub fn is_supervised(&self) -> bool {
        self.tool == ToolKind::SolutionTool
    }

    /// Human-readable rendering for progress lines.
    pub fn printable(&self) -> String {
        let mut tokens = vec![self.program.display().to_string()];
        tokens.extend(self.args.iter().cloned());
        tokens.join(" ")
    }
}
