//! Project descriptor scanner.
//!
//! Property blocks are keyed by the `Configuration|Platform` predicate of the
//! property-group condition that opens them; scoped field probes (output
//! path, architecture list, signing/packaging flags) only fire while such a
//! scope is open. Everything else (assembly name, output type, references,
//! type GUIDs, imports) is probed on every line.

use crate::api::{self, Api, OutputType, TestKind};
use crate::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static CONDITION_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'\$\(Configuration\)\|\$\(Platform\)'\s*==\s*'(?P<value>[^']*)'")
        .expect("condition pattern")
});

static CONDITION_CONFIG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'\$\(Configuration\)'\s*==\s*'(?P<value>[^']*)'").expect("condition pattern")
});

static CONDITION_PLATFORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'\$\(Platform\)'\s*==\s*'(?P<value>[^']*)'").expect("condition pattern")
});

static OUTPUT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<OutputPath>(?P<value>[^<]*)</OutputPath>").expect("pattern"));

static MTOUCH_ARCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<MtouchArch>(?P<value>[^<]*)</MtouchArch>").expect("pattern"));

static ANDROID_KEYSTORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<AndroidKeyStore>(?P<value>[^<]*)</AndroidKeyStore>").expect("pattern")
});

static BUILD_IPA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<BuildIpa>(?P<value>[^<]*)</BuildIpa>").expect("pattern"));

static ASSEMBLY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<AssemblyName>(?P<value>[^<]*)</AssemblyName>").expect("pattern")
});

static OUTPUT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<OutputType>(?P<value>[^<]*)</OutputType>").expect("pattern"));

static TYPE_GUIDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ProjectTypeGuids>(?P<value>[^<]*)</ProjectTypeGuids>").expect("pattern")
});

static ANDROID_APPLICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<AndroidApplication>(?P<value>[^<]*)</AndroidApplication>").expect("pattern")
});

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<Reference Include="(?P<value>[^"]*)""#).expect("pattern"));

static REFERENCED_PROJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Project>\{(?P<value>[^}]*)\}</Project>").expect("pattern"));

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<Import Project="(?P<value>[^"]*)""#).expect("pattern"));

/// Facts captured for one `Configuration|Platform` property scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfigFacts {
    pub configuration: String,
    pub platform: String,
    /// Declared relative output path, separators normalized, no trailing
    /// slash. May still contain `$(Configuration)`/`$(Platform)` tokens.
    pub output_path: Option<String>,
    /// Declared device architecture list.
    pub mtouch_archs: Vec<String>,
    /// Package signing requested for this configuration.
    pub sign_package: bool,
    /// Device package build requested for this configuration.
    pub build_ipa: bool,
}

/// Raw facts extracted from one project descriptor (plus its imports).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFacts {
    pub path: PathBuf,
    pub assembly_name: Option<String>,
    pub output_type: OutputType,
    pub api: Api,
    pub test_kinds: BTreeSet<TestKind>,
    pub android_application: bool,
    /// Ids of referenced projects, uppercased.
    pub referenced_ids: BTreeSet<String>,
    /// `Configuration|Platform` → captured facts. Condition predicates that
    /// name only one axis produce keys with the other side empty
    /// (`Debug|`, `|iPhone`).
    pub configs: BTreeMap<String, ProjectConfigFacts>,
}

impl ProjectFacts {
    /// Scan a project file and everything it imports.
    ///
    /// Imports are resolved against the importing file's directory and
    /// followed recursively; there is no cycle guard, mirroring the behavior
    /// of the build tools this parser fronts. A cyclic import pair is a
    /// malformed input and will recurse until the stack runs out.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        let mut facts = ProjectFacts {
            path: path.to_path_buf(),
            assembly_name: None,
            output_type: OutputType::default(),
            api: Api::Unknown,
            test_kinds: BTreeSet::new(),
            android_application: false,
            referenced_ids: BTreeSet::new(),
            configs: BTreeMap::new(),
        };
        facts.scan(&contents, &base_dir);
        Ok(facts)
    }

    fn scan(&mut self, contents: &str, base_dir: &Path) {
        // Scope state is per scanned file; imported files open and close
        // their own property groups.
        let mut scope: Option<String> = None;
        let mut in_project_reference = false;
        let mut reference_api = Api::Unknown;
        let mut guid_api = Api::Unknown;

        for raw_line in contents.lines() {
            let line = raw_line.trim();

            if line.contains("<PropertyGroup") {
                scope = condition_key(line);
            } else if line.contains("</PropertyGroup>") {
                scope = None;
            }

            if let Some(key) = &scope {
                let entry = self.config_entry(key.clone());
                if let Some(caps) = OUTPUT_PATH.captures(line) {
                    let path = caps["value"].trim().replace('\\', "/");
                    entry.output_path = Some(path.trim_end_matches('/').to_string());
                }
                if let Some(caps) = MTOUCH_ARCH.captures(line) {
                    entry.mtouch_archs = caps["value"]
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                if let Some(caps) = ANDROID_KEYSTORE.captures(line) {
                    if caps["value"].trim().eq_ignore_ascii_case("true") {
                        entry.sign_package = true;
                    }
                }
                if let Some(caps) = BUILD_IPA.captures(line) {
                    if caps["value"].trim().eq_ignore_ascii_case("true") {
                        entry.build_ipa = true;
                    }
                }
            }

            if let Some(caps) = ASSEMBLY_NAME.captures(line) {
                self.assembly_name = Some(caps["value"].trim().to_string());
            }
            if let Some(caps) = OUTPUT_TYPE.captures(line) {
                self.output_type = OutputType::parse(&caps["value"]);
            }
            if let Some(caps) = TYPE_GUIDS.captures(line) {
                guid_api = api::classify_type_guids(&caps["value"]);
            }
            if let Some(caps) = ANDROID_APPLICATION.captures(line) {
                if caps["value"].trim().eq_ignore_ascii_case("true") {
                    self.android_application = true;
                }
            }
            if let Some(caps) = REFERENCE.captures(line) {
                let include = &caps["value"];
                if reference_api == Api::Unknown {
                    reference_api = api::classify_reference(include);
                }
                if let Some(kind) = api::classify_test_reference(include) {
                    self.test_kinds.insert(kind);
                }
            }

            if line.contains("<ProjectReference") {
                in_project_reference = true;
            }
            if in_project_reference {
                if let Some(caps) = REFERENCED_PROJECT_ID.captures(line) {
                    self.referenced_ids.insert(caps["value"].to_uppercase());
                }
                if line.contains("</ProjectReference>") {
                    in_project_reference = false;
                }
            }

            if let Some(caps) = IMPORT.captures(line) {
                self.follow_import(&caps["value"], base_dir);
            }
        }

        // A framework reference is the stronger signal; type GUIDs break the
        // tie for projects that reference neither.
        let scanned_api = if reference_api != Api::Unknown {
            reference_api
        } else {
            guid_api
        };
        if self.api == Api::Unknown {
            self.api = scanned_api;
        }
    }

    fn follow_import(&mut self, import: &str, base_dir: &Path) {
        // Imports of SDK targets files are spelled with build variables;
        // those cannot be resolved textually and carry no project facts.
        if import.contains("$(") {
            return;
        }
        let rel = import.replace('\\', "/");
        let import_path = if Path::new(&rel).is_absolute() {
            PathBuf::from(&rel)
        } else {
            base_dir.join(&rel)
        };
        let Ok(contents) = std::fs::read_to_string(&import_path) else {
            debug!(path = %import_path.display(), "skipping unreadable import");
            return;
        };
        let import_dir = import_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        self.scan(&contents, &import_dir);
    }

    fn config_entry(&mut self, key: String) -> &mut ProjectConfigFacts {
        self.configs.entry(key.clone()).or_insert_with(|| {
            let (configuration, platform) = key.split_once('|').unwrap_or((key.as_str(), ""));
            ProjectConfigFacts {
                configuration: configuration.to_string(),
                platform: platform.to_string(),
                ..ProjectConfigFacts::default()
            }
        })
    }
}

/// Extract the config key of a property-group condition line, if any.
///
/// Both-axis predicates key as `Cfg|Platform`; single-axis predicates leave
/// the other side empty. Spaces are stripped so `Any CPU` and `AnyCPU`
/// predicates land on the same key.
fn condition_key(line: &str) -> Option<String> {
    if let Some(caps) = CONDITION_FULL.captures(line) {
        return Some(caps["value"].replace(' ', ""));
    }
    if let Some(caps) = CONDITION_CONFIG.captures(line) {
        return Some(format!("{}|", caps["value"].trim()));
    }
    if let Some(caps) = CONDITION_PLATFORM.captures(line) {
        return Some(format!("|{}", caps["value"].replace(' ', "")));
    }
    None
}
