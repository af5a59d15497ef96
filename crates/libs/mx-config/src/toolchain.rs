//! Toolchain paths and supervision deadlines.

use crate::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Locations of the external tools the orchestrator invokes.
///
/// Defaults carry the conventional install locations; a TOML file can
/// override any of them, and tests point them at stub scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    /// Interactive solution build tool. Loads the whole project graph before
    /// building, which is why its invocations run under the hang watchdog.
    pub solution_tool: PathBuf,
    /// Batch MSBuild-style build tool.
    pub msbuild: PathBuf,
    /// Device listing/control tool (`simctl` front end).
    pub device_tool: PathBuf,
    /// Simulator application launched to boot a device.
    pub simulator_app: PathBuf,
    /// Launcher used to open the simulator application.
    pub opener: PathBuf,
    /// Process killer used to shut down simulator processes.
    pub process_killer: PathBuf,
    /// Managed runtime used to host the test harness console.
    pub runtime: PathBuf,
    /// Test harness console runner.
    pub test_harness: PathBuf,
    /// Directory holding dated archive bundles produced by archive builds.
    pub archives_dir: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            solution_tool: PathBuf::from(
                "/Applications/Xamarin Studio.app/Contents/MacOS/mdtool",
            ),
            msbuild: PathBuf::from(
                "/Library/Frameworks/Mono.framework/Versions/Current/bin/xbuild",
            ),
            device_tool: PathBuf::from("/usr/bin/simctl"),
            simulator_app: PathBuf::from(
                "/Applications/Xcode.app/Contents/Developer/Applications/Simulator.app",
            ),
            opener: PathBuf::from("/usr/bin/open"),
            process_killer: PathBuf::from("/usr/bin/killall"),
            runtime: PathBuf::from(
                "/Library/Frameworks/Mono.framework/Versions/Current/bin/mono",
            ),
            test_harness: PathBuf::from(
                "/Library/Frameworks/Mono.framework/Versions/Current/Commands/nunit3-console",
            ),
            archives_dir: default_archives_dir(),
        }
    }
}

fn default_archives_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join("Library/Developer/Xcode/Archives")
}

/// Deadlines for the build executor's hang watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogSettings {
    /// Output line that marks the start of the hang-prone project-loading
    /// phase. The stall timer is armed only after this line is observed.
    pub checkpoint: String,
    /// Seconds without further output before the process is interrupted.
    pub stall_timeout_secs: u64,
    /// Seconds to wait after the interrupt before force-killing.
    pub force_kill_timeout_secs: u64,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            checkpoint: String::from("Loading projects"),
            stall_timeout_secs: 300,
            force_kill_timeout_secs: 60,
        }
    }
}

impl WatchdogSettings {
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }

    pub fn force_kill_timeout(&self) -> Duration {
        Duration::from_secs(self.force_kill_timeout_secs)
    }
}

/// Deadlines and intervals for device lifecycle polling loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Milliseconds between state polls.
    pub poll_interval_ms: u64,
    /// Seconds to wait for all devices to reach Shutdown.
    pub shutdown_timeout_secs: u64,
    /// Seconds to wait for a booted device to answer a URL open.
    pub boot_timeout_secs: u64,
    /// Seconds to settle after a successful boot.
    pub settle_delay_secs: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            shutdown_timeout_secs: 60,
            boot_timeout_secs: 60,
            settle_delay_secs: 2,
        }
    }
}

impl DeviceSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.boot_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

/// Root configuration for the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MxConfig {
    /// External tool locations.
    pub toolchain: Toolchain,
    /// Hang watchdog deadlines.
    pub watchdog: WatchdogSettings,
    /// Device lifecycle deadlines.
    pub device: DeviceSettings,
}

impl MxConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}
