//! Interactive solution build tool command construction.
//!
//! The tool builds one project of a solution at a time, addressed by display
//! name, with the *project-side* configuration pair passed as a single
//! `-c:Configuration|Platform` token. The platform part is omitted for the
//! canonical AnyCPU platform, which the tool does not accept.

use std::path::{Path, PathBuf};

use crate::command::{BuildCommand, CommandKind, ToolKind};

/// Builder for solution-tool invocations.
#[derive(Debug, Clone)]
pub struct SolutionToolCommand {
    program: PathBuf,
    solution: PathBuf,
    target: String,
    configuration: String,
    platform: String,
    project_name: Option<String>,
}

impl SolutionToolCommand {
    pub fn new(program: &Path, solution: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            solution: solution.to_path_buf(),
            target: String::from("build"),
            configuration: String::new(),
            platform: String::new(),
            project_name: None,
        }
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    pub fn configuration(mut self, configuration: &str) -> Self {
        self.configuration = configuration.to_string();
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self
    }

    pub fn project_name(mut self, name: &str) -> Self {
        self.project_name = Some(name.to_string());
        self
    }

    pub fn into_command(self, kind: CommandKind, project_id: Option<String>) -> BuildCommand {
        let mut args = vec![self.target];

        let mut config = self.configuration;
        if !self.platform.is_empty() && !is_any_cpu(&self.platform) {
            config.push('|');
            config.push_str(&self.platform);
        }
        if !config.is_empty() {
            args.push(format!("-c:{config}"));
        }

        args.push(self.solution.display().to_string());

        if let Some(name) = self.project_name {
            args.push(format!("-p:{name}"));
        }

        BuildCommand {
            tool: ToolKind::SolutionTool,
            kind,
            project_id,
            program: self.program,
            args,
        }
    }
}

pub(crate) fn is_any_cpu(platform: &str) -> bool {
    platform == "AnyCPU" || platform == "Any CPU"
}
