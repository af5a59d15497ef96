//! Batch MSBuild-style command construction.

use std::path::{Path, PathBuf};

use crate::command::{BuildCommand, CommandKind, ToolKind};
use crate::mdtool::is_any_cpu;

/// Builder for batch build-tool invocations.
#[derive(Debug, Clone)]
pub struct MsBuildCommand {
    program: PathBuf,
    project: PathBuf,
    target: String,
    configuration: String,
    platform: Option<String>,
}

impl MsBuildCommand {
    pub fn new(program: &Path, project: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            project: project.to_path_buf(),
            target: String::from("Build"),
            configuration: String::new(),
            platform: None,
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

    /// Platform property; silently dropped for the AnyCPU spellings, which
    /// the tool resolves on its own.
    pub fn platform(mut self, platform: &str) -> Self {
        if !platform.is_empty() && !is_any_cpu(platform) {
            self.platform = Some(platform.to_string());
        }
        self
    }

    pub fn into_command(self, kind: CommandKind, project_id: Option<String>) -> BuildCommand {
        let mut args = vec![format!("/t:{}", self.target)];

        if !self.configuration.is_empty() {
            args.push(format!("/p:Configuration={}", self.configuration));
        }
        if let Some(platform) = self.platform {
            args.push(format!("/p:Platform={platform}"));
        }

        args.push(self.project.display().to_string());
        args.push(String::from("/verbosity:minimal"));
        args.push(String::from("/nologo"));

        BuildCommand {
            tool: ToolKind::MsBuild,
            kind,
            project_id,
            program: self.program,
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_command_shape() {
        let command = MsBuildCommand::new(Path::new("/opt/xbuild"), Path::new("/w/Droid.csproj"))
            .target("PackageForAndroid")
            .configuration("Release")
            .platform("AnyCPU")
            .into_command(CommandKind::Package, Some("ID".into()));

        assert_eq!(
            command.args,
            vec![
                "/t:PackageForAndroid",
                "/p:Configuration=Release",
                "/w/Droid.csproj",
                "/verbosity:minimal",
                "/nologo"
            ]
        );
        assert!(!command.is_supervised());
    }

    #[test]
    fn concrete_platform_is_passed_through() {
        let command = MsBuildCommand::new(Path::new("/opt/xbuild"), Path::new("/w/S.sln"))
            .configuration("Release")
            .platform("iPhone")
            .into_command(CommandKind::Build, None);

        assert!(command.args.contains(&"/p:Platform=iPhone".to_string()));
    }
}
