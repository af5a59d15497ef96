//! Target API classification tables.
//!
//! Classification is table-driven: a project belongs to an API when its
//! descriptor references one of the API's framework assemblies or carries one
//! of the API's project-type GUIDs. Unrecognized projects stay [`Api::Unknown`]
//! and are excluded from command generation.

use serde::{Deserialize, Serialize};

/// Target platform category of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Api {
    Ios,
    Android,
    Mac,
    TvOs,
    Unknown,
}

impl std::fmt::Display for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Api::Ios => "ios",
            Api::Android => "android",
            Api::Mac => "mac",
            Api::TvOs => "tvos",
            Api::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Test role of a project, derived from its test-framework references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TestKind {
    /// UI test project driving an installed application.
    UiTest,
    /// Plain unit test project run on the host.
    Unit,
    /// Unit test project run on the device itself.
    DeviceUnit,
}

/// Output kind of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputType {
    Exe,
    #[default]
    Library,
}

impl OutputType {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("exe") {
            OutputType::Exe
        } else {
            OutputType::Library
        }
    }
}

const IOS_TYPE_GUIDS: &[&str] = &[
    "E613F3A2-FE9C-494F-B74E-F63BCB86FEA6",
    "6BC8ED88-2882-458C-8E55-DFD12B67127B",
    "F5B4F3BC-B597-4E2B-B552-EF5D8A32436F",
    "FEACFBD2-3405-455C-9665-78FE426C6842",
    "8FFB629D-F513-41CE-95D2-7ECE97B6EEEC",
    "EE2C853D-36AF-4FDB-B1AD-8E90477E2198",
];

const ANDROID_TYPE_GUIDS: &[&str] = &[
    "EFBA0AD7-5A72-4C68-AF49-83D382785DCF",
    "10368E6C-D01B-4462-8E8B-01FC667A7035",
];

const MAC_TYPE_GUIDS: &[&str] = &[
    "1C533B1C-72DD-4CB1-9F6B-BF11D93BCFBE",
    "42C0BBD9-55CE-4FC1-8D90-A7348ABAFB23",
    "A3F8F2AB-B479-4A4A-A458-A89E7DC349F1",
];

const TVOS_TYPE_GUIDS: &[&str] = &["06FA79CB-D6CD-4721-BB4B-1BD202089C55"];

const IOS_REFERENCES: &[&str] = &["monotouch", "Xamarin.iOS"];
const ANDROID_REFERENCES: &[&str] = &["Mono.Android"];
const MAC_REFERENCES: &[&str] = &["Xamarin.Mac", "MonoMac"];
const TVOS_REFERENCES: &[&str] = &["Xamarin.TVOS"];

/// Classify an API from a `;`-separated project-type GUID list.
///
/// Braces and case are ignored; the first GUID found in any table wins.
pub fn classify_type_guids(guid_list: &str) -> Api {
    for raw in guid_list.split(';') {
        let guid = raw.trim().trim_start_matches('{').trim_end_matches('}').to_uppercase();
        if IOS_TYPE_GUIDS.contains(&guid.as_str()) {
            return Api::Ios;
        }
        if ANDROID_TYPE_GUIDS.contains(&guid.as_str()) {
            return Api::Android;
        }
        if MAC_TYPE_GUIDS.contains(&guid.as_str()) {
            return Api::Mac;
        }
        if TVOS_TYPE_GUIDS.contains(&guid.as_str()) {
            return Api::TvOs;
        }
    }
    Api::Unknown
}

/// Classify an API from a referenced assembly name.
///
/// Reference includes may carry trailing version metadata
/// (`Xamarin.iOS, Version=…`), so matching is prefix-based on the assembly
/// name component.
pub fn classify_reference(include: &str) -> Api {
    let name = include.split(',').next().unwrap_or(include).trim();
    if IOS_REFERENCES.contains(&name) {
        return Api::Ios;
    }
    if ANDROID_REFERENCES.contains(&name) {
        return Api::Android;
    }
    if MAC_REFERENCES.contains(&name) {
        return Api::Mac;
    }
    if TVOS_REFERENCES.contains(&name) {
        return Api::TvOs;
    }
    Api::Unknown
}

/// Classify a test-framework reference, if the assembly denotes one.
pub fn classify_test_reference(include: &str) -> Option<TestKind> {
    let name = include.split(',').next().unwrap_or(include).trim();
    match name {
        "Xamarin.UITest" => Some(TestKind::UiTest),
        "nunit.framework" => Some(TestKind::Unit),
        "MonoTouch.NUnitLite" => Some(TestKind::DeviceUnit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ios_type_guids_classify() {
        for guid in IOS_TYPE_GUIDS {
            assert_eq!(classify_type_guids(&format!("{{{guid}}}")), Api::Ios);
        }
    }

    #[test]
    fn android_guid_list_with_generic_tail() {
        let list = "{10368E6C-D01B-4462-8E8B-01FC667A7035};{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";
        assert_eq!(classify_type_guids(list), Api::Android);
    }

    #[test]
    fn mac_guid_lists_classify() {
        let lists = [
            "{1C533B1C-72DD-4CB1-9F6B-BF11D93BCFBE};{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}",
            "{42C0BBD9-55CE-4FC1-8D90-A7348ABAFB23};{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}",
        ];
        for list in lists {
            assert_eq!(classify_type_guids(list), Api::Mac);
        }
    }

    #[test]
    fn tvos_guid_classifies() {
        assert_eq!(
            classify_type_guids("{06FA79CB-D6CD-4721-BB4B-1BD202089C55}"),
            Api::TvOs
        );
    }

    #[test]
    fn malformed_guid_is_unknown() {
        assert_eq!(classify_type_guids("{06FA79CB-D6CD-4721-BB4B}"), Api::Unknown);
    }

    #[test]
    fn reference_markers_classify() {
        assert_eq!(classify_reference("monotouch"), Api::Ios);
        assert_eq!(classify_reference("Xamarin.iOS"), Api::Ios);
        assert_eq!(classify_reference("Mono.Android"), Api::Android);
        assert_eq!(classify_reference("MonoMac"), Api::Mac);
        assert_eq!(
            classify_reference("Xamarin.iOS, Version=1.0, Culture=neutral"),
            Api::Ios
        );
        assert_eq!(classify_reference("System.Xml"), Api::Unknown);
    }

    #[test]
    fn test_framework_references_classify() {
        assert_eq!(classify_test_reference("Xamarin.UITest"), Some(TestKind::UiTest));
        assert_eq!(classify_test_reference("nunit.framework"), Some(TestKind::Unit));
        assert_eq!(
            classify_test_reference("MonoTouch.NUnitLite"),
            Some(TestKind::DeviceUnit)
        );
        assert_eq!(classify_test_reference("System.Core"), None);
    }
}
