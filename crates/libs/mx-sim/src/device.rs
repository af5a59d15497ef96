//! Device listing parsing.
//!
//! The device-listing tool prints OS-version section headers (`-- iOS 10.1
//! --`) followed by indented device lines (`    iPhone 6 (UDID) (State)`).
//! Lines marked unavailable are ignored. State is parsed fresh from every
//! listing; the listing reflects the real environment and is never cached
//! beyond one decision cycle.

use crate::prelude::*;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-- (?P<os>.+) --$").expect("section pattern"));

static DEVICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s*\((?P<udid>[0-9A-Fa-f-]+)\)\s*\((?P<state>\w+)\)")
        .expect("device pattern")
});

/// Live state of a listed device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    Booted,
    Shutdown,
    Other(String),
}

impl FromStr for DeviceState {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match raw {
            "Booted" => DeviceState::Booted,
            "Shutdown" => DeviceState::Shutdown,
            other => DeviceState::Other(other.to_string()),
        })
    }
}

/// One discovered simulator device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDevice {
    pub name: String,
    pub udid: String,
    pub os_version: String,
    pub state: DeviceState,
}

/// Find a named device in the section for the requested OS version.
pub fn find_device(listing: &str, os_version: &str, device_name: &str) -> Result<SimDevice> {
    let mut in_section = false;

    for line in listing.lines() {
        if line.to_lowercase().contains("unavailable") {
            continue;
        }
        if let Some(caps) = SECTION_HEADER.captures(line.trim()) {
            in_section = &caps["os"] == os_version;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some(caps) = DEVICE_LINE.captures(line.trim()) {
            if &caps["name"] == device_name {
                return Ok(SimDevice {
                    name: device_name.to_string(),
                    udid: caps["udid"].to_string(),
                    os_version: os_version.to_string(),
                    state: caps["state"].parse().unwrap_or(DeviceState::Shutdown),
                });
            }
        }
    }

    Err(Error::DeviceNotFound {
        device: device_name.to_string(),
        os_version: os_version.to_string(),
    })
}

/// States of every listed device, section membership ignored.
pub fn all_states(listing: &str) -> Vec<DeviceState> {
    listing
        .lines()
        .filter(|line| !line.to_lowercase().contains("unavailable"))
        .filter_map(|line| DEVICE_LINE.captures(line.trim()))
        .filter_map(|caps| caps["state"].parse().ok())
        .collect()
}

/// Whether every listed device reports Shutdown.
pub fn all_shutdown(listing: &str) -> bool {
    all_states(listing)
        .iter()
        .all(|state| *state == DeviceState::Shutdown)
}

/// Resolve a `latest` OS version request against the section headers.
///
/// Section headers spell `<platform> <version>`; the numerically greatest
/// version for the platform wins. Two-component versions are padded for
/// comparison but reported as listed.
pub fn latest_os_version(listing: &str, platform: &str) -> Result<String> {
    let mut latest: Option<(Version, String)> = None;

    for line in listing.lines() {
        let Some(caps) = SECTION_HEADER.captures(line.trim()) else {
            continue;
        };
        let os = caps["os"].to_string();
        let Some(version_str) = os.strip_prefix(platform).map(str::trim) else {
            continue;
        };
        let Some(version) = parse_lenient_version(version_str) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(best, _)| version > *best) {
            latest = Some((version, os));
        }
    }

    latest
        .map(|(_, os)| os)
        .ok_or_else(|| Error::NoRuntimeVersion(platform.to_string()))
}

fn parse_lenient_version(raw: &str) -> Option<Version> {
    let mut parts = raw.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map(|p| p.parse().ok()).unwrap_or(Some(0))?;
    let patch = parts.next().map(|p| p.parse().ok()).unwrap_or(Some(0))?;
    Some(Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
== Devices ==
-- iOS 9.3 --
    iPhone 4s (11111111-A716-4E46-B2B2-9DA43F1E7E4F) (Shutdown)
    iPhone 6 (22222222-930C-4BA4-9576-B9EF73F35D41) (Shutdown)
-- iOS 10.1 --
    iPhone 6 (33333333-87DC-4F32-A6B4-9B7DC4B52A69) (Booted)
    iPad Air (44444444-C95A-47C2-AFFD-2D394BBFA183) (Shutdown)
-- tvOS 10.0 --
    Apple TV 1080p (55555555-00D9-44E9-8CAE-CD31A3E3E3B8) (Shutdown)
-- Unavailable: com.apple.CoreSimulator.SimRuntime.iOS-8-4 --
    iPhone 5 (66666666-D2B4-4E8C-A3B1-2070D5456B39) (Shutdown) (unavailable)
"#;

    #[test]
    fn finds_a_device_in_its_section() {
        let device = find_device(LISTING, "iOS 10.1", "iPhone 6").unwrap();
        assert_eq!(device.udid, "33333333-87DC-4F32-A6B4-9B7DC4B52A69");
        assert_eq!(device.state, DeviceState::Booted);
    }

    #[test]
    fn the_same_name_in_an_earlier_section_does_not_shadow() {
        let device = find_device(LISTING, "iOS 9.3", "iPhone 6").unwrap();
        assert_eq!(device.udid, "22222222-930C-4BA4-9576-B9EF73F35D41");
        assert_eq!(device.state, DeviceState::Shutdown);
    }

    #[test]
    fn missing_device_is_an_error() {
        let err = find_device(LISTING, "iOS 10.1", "iPhone 99").unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound { .. }));
    }

    #[test]
    fn unavailable_lines_are_ignored() {
        assert!(find_device(LISTING, "iOS 8.4", "iPhone 5").is_err());
        // The unavailable device's state must not leak into the global scan.
        assert_eq!(all_states(LISTING).len(), 5);
    }

    #[test]
    fn shutdown_scan_sees_every_section() {
        assert!(!all_shutdown(LISTING));

        let quiet = LISTING.replace("(Booted)", "(Shutdown)");
        assert!(all_shutdown(&quiet));
    }

    #[test]
    fn latest_resolves_the_greatest_version() {
        assert_eq!(latest_os_version(LISTING, "iOS").unwrap(), "iOS 10.1");
        assert_eq!(latest_os_version(LISTING, "tvOS").unwrap(), "tvOS 10.0");
        assert!(matches!(
            latest_os_version(LISTING, "watchOS"),
            Err(Error::NoRuntimeVersion(_))
        ));
    }
}
