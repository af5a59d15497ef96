//! End-to-end: a solution on disk resolves into a graph that generates the
//! expected ordered command sequences.

use std::fs;
use std::path::{Path, PathBuf};

use mx_build::{BuildRequest, CommandKind, Collector, Generator};
use mx_config::Toolchain;
use mx_descriptor::Api;

const APP_ID: &str = "8B618FBA-3179-42BF-856D-0F9CC190A735";
const TEST_ID: &str = "CC3F100B-2BF8-4BF1-93C3-4DBCBBBB0360";

fn write_solution(dir: &Path) -> PathBuf {
    let ios_dir = dir.join("iOS");
    let tests_dir = dir.join("UITests");
    fs::create_dir_all(&ios_dir).unwrap();
    fs::create_dir_all(&tests_dir).unwrap();

    fs::write(
        ios_dir.join("SampleApp.iOS.csproj"),
        r#"
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <AssemblyName>SampleApp.iOS</AssemblyName>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|iPhone' ">
    <OutputPath>bin\iPhone\Release</OutputPath>
    <MtouchArch>ARMv7</MtouchArch>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="Xamarin.iOS" />
  </ItemGroup>
"#,
    )
    .unwrap();

    fs::write(
        tests_dir.join("SampleApp.UITests.csproj"),
        format!(
            r#"
  <PropertyGroup>
    <OutputType>Library</OutputType>
    <AssemblyName>SampleApp.UITests</AssemblyName>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|AnyCPU' ">
    <OutputPath>bin\Release</OutputPath>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="Xamarin.UITest" />
  </ItemGroup>
  <ItemGroup>
    <ProjectReference Include="..\iOS\SampleApp.iOS.csproj">
      <Project>{{{APP_ID}}}</Project>
    </ProjectReference>
  </ItemGroup>
"#
        ),
    )
    .unwrap();

    let solution = format!(
        r#"
Project("{{FEACFBD2-3405-455C-9665-78FE426C6842}}") = "SampleApp.iOS", "iOS\SampleApp.iOS.csproj", "{{{APP_ID}}}"
EndProject
Project("{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}") = "SampleApp.UITests", "UITests\SampleApp.UITests.csproj", "{{{TEST_ID}}}"
EndProject
Global
	GlobalSection(SolutionConfigurationPlatforms) = preSolution
		Release|iPhone = Release|iPhone
	EndGlobalSection
	GlobalSection(ProjectConfigurationPlatforms) = postSolution
		{{{APP_ID}}}.Release|iPhone.ActiveCfg = Release|iPhone
		{{{TEST_ID}}}.Release|iPhone.ActiveCfg = Release|Any CPU
	EndGlobalSection
EndGlobal
"#
    );
    let path = dir.join("SampleApp.sln");
    fs::write(&path, solution).unwrap();
    path
}

fn toolchain() -> Toolchain {
    Toolchain {
        solution_tool: PathBuf::from("/opt/mdtool"),
        msbuild: PathBuf::from("/opt/xbuild"),
        ..Toolchain::default()
    }
}

#[test]
fn application_build_emits_build_then_archive() {
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path());

    let graph = mx_graph::resolve(&solution).unwrap();
    let toolchain = toolchain();
    let request = BuildRequest::new("Release", "iPhone").with_apis([Api::Ios]);

    let generated = Generator::new(&graph, &toolchain).commands_for(&request);
    assert!(generated.errors.is_empty());
    assert_eq!(generated.commands.len(), 2);
    assert_eq!(generated.commands[0].kind, CommandKind::Build);
    assert_eq!(generated.commands[1].kind, CommandKind::Archive);
    for command in &generated.commands {
        assert_eq!(command.project_id.as_deref(), Some(APP_ID));
        assert!(command.args.contains(&"-c:Release|iPhone".to_string()));
        assert!(command.args.contains(&"-p:SampleApp.iOS".to_string()));
    }
}

#[test]
fn test_build_adds_the_test_project_after_its_application() {
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path());

    let graph = mx_graph::resolve(&solution).unwrap();
    let toolchain = toolchain();
    let request = BuildRequest::new("Release", "iPhone").with_apis([Api::Ios]);

    let generated = Generator::new(&graph, &toolchain).test_build_commands(&request);
    assert!(generated.errors.is_empty());
    assert_eq!(generated.commands.len(), 3);

    assert_eq!(generated.commands[0].project_id.as_deref(), Some(APP_ID));
    assert_eq!(generated.commands[0].kind, CommandKind::Build);
    assert_eq!(generated.commands[1].project_id.as_deref(), Some(APP_ID));
    assert_eq!(generated.commands[1].kind, CommandKind::Archive);

    let test_build = &generated.commands[2];
    assert_eq!(test_build.project_id.as_deref(), Some(TEST_ID));
    assert_eq!(
        test_build.args,
        vec![
            "build".to_string(),
            "-c:Release".to_string(),
            solution.display().to_string(),
            "-p:SampleApp.UITests".to_string(),
        ]
    );
}

#[test]
fn collection_after_a_simulated_build_finds_the_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let solution = write_solution(dir.path());

    // Simulate what the external tools would have produced.
    let app_out = dir.path().join("iOS/bin/iPhone/Release");
    fs::create_dir_all(app_out.join("SampleApp.iOS.app")).unwrap();
    let test_out = dir.path().join("UITests/bin/Release");
    fs::create_dir_all(&test_out).unwrap();
    fs::write(test_out.join("SampleApp.UITests.dll"), b"dll").unwrap();

    let graph = mx_graph::resolve(&solution).unwrap();
    let toolchain = toolchain();
    let request = BuildRequest::new("Release", "iPhone").with_apis([Api::Ios]);

    let manifest = Collector::new(&graph, &toolchain).collect(&request);
    assert!(manifest.get(APP_ID).unwrap().app.is_some());
    assert_eq!(manifest.get(TEST_ID).unwrap().uitest_assemblies.len(), 1);
}
