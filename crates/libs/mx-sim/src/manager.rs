//! Device lifecycle state machine.
//!
//! `discover → shutdown_all → erase → boot → install`, each transition a
//! blocking call bounded by its own deadline. No two lifecycle operations
//! run concurrently against the same device.

use crate::device::{self, SimDevice};
use crate::prelude::*;
use std::path::Path;
use std::process::Output;

use mx_config::{DeviceSettings, Toolchain};
use tokio::process::Command;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

const BOOT_PROBE_URL: &str = "https://www.google.com";
const SIMULATOR_PROCESS_NAME: &str = "Simulator";

/// Drives one simulator device through its lifecycle.
pub struct DeviceManager {
    toolchain: Toolchain,
    settings: DeviceSettings,
}

impl DeviceManager {
    pub fn new(toolchain: Toolchain, settings: DeviceSettings) -> Self {
        Self {
            toolchain,
            settings,
        }
    }

    /// Find the requested device in the live listing.
    ///
    /// `latest` as an OS version resolves to the numerically greatest listed
    /// runtime of the device platform.
    pub async fn discover(&self, device_name: &str, os_version: &str) -> Result<SimDevice> {
        let listing = self.list_output().await?;

        let os_version = if os_version == "latest" {
            let resolved = device::latest_os_version(&listing, "iOS")?;
            info!("resolved latest os version to {resolved}");
            resolved
        } else {
            os_version.to_string()
        };

        let found = device::find_device(&listing, &os_version, device_name)?;
        info!(
            "device {} ({}) is {:?}",
            found.name, found.udid, found.state
        );
        Ok(found)
    }

    /// Bring every simulator device to Shutdown.
    ///
    /// A listing that already reports Shutdown everywhere is a no-op: no
    /// kill command is issued. Otherwise simulator processes are killed and
    /// the listing is polled until every device settles or the deadline
    /// passes.
    pub async fn shutdown_all(&self) -> Result<()> {
        let listing = self.list_output().await?;
        if device::all_shutdown(&listing) {
            debug!("all devices already shut down");
            return Ok(());
        }

        info!("shutting down running simulators");
        self.run_checked(&self.toolchain.process_killer, &[SIMULATOR_PROCESS_NAME])
            .await?;

        let deadline = Instant::now() + self.settings.shutdown_timeout();
        loop {
            sleep(self.settings.poll_interval()).await;
            let listing = self.list_output().await?;
            if device::all_shutdown(&listing) {
                return Ok(());
            }
            debug!("waiting for shutdown ...");
            if Instant::now() >= deadline {
                return Err(Error::ShutdownTimeout);
            }
        }
    }

    /// Reset device storage. Failure is fatal and not retried.
    pub async fn erase(&self, device: &SimDevice) -> Result<()> {
        info!("erasing device {}", device.udid);
        self.run_checked(
            &self.toolchain.device_tool,
            &["erase", device.udid.as_str()],
        )
        .await
    }

    /// Launch the simulator bound to the device and wait until it answers.
    ///
    /// Readiness is probed with a harmless URL open against the device; the
    /// device is booted once the probe reports no error. A short settle
    /// delay follows before the caller proceeds.
    pub async fn boot(&self, device: &SimDevice) -> Result<()> {
        info!("booting device {}", device.udid);
        let simulator_app = self.toolchain.simulator_app.display().to_string();
        self.run_checked(
            &self.toolchain.opener,
            &[
                simulator_app.as_str(),
                "--args",
                "-CurrentDeviceUDID",
                device.udid.as_str(),
            ],
        )
        .await?;

        let deadline = Instant::now() + self.settings.boot_timeout();
        loop {
            sleep(self.settings.poll_interval()).await;
            let output = self
                .run(
                    &self.toolchain.device_tool,
                    &["openurl", device.udid.as_str(), BOOT_PROBE_URL],
                )
                .await?;
            if output.status.success() && output.stdout.is_empty() && output.stderr.is_empty() {
                break;
            }
            debug!("waiting for boot ...");
            if Instant::now() >= deadline {
                return Err(Error::BootTimeout(device.udid.clone()));
            }
        }

        sleep(self.settings.settle_delay()).await;
        Ok(())
    }

    /// Install an application artifact onto the booted device.
    pub async fn install(&self, device: &SimDevice, app_path: &Path) -> Result<()> {
        info!("installing {} to {}", app_path.display(), device.udid);
        let app = app_path.display().to_string();
        self.run_checked(
            &self.toolchain.device_tool,
            &["install", device.udid.as_str(), app.as_str()],
        )
        .await
    }

    /// Full deployment sequence against one device.
    pub async fn prepare(&self, device: &SimDevice, app_path: &Path) -> Result<()> {
        self.shutdown_all().await?;
        self.erase(device).await?;
        self.boot(device).await?;
        self.install(device, app_path).await
    }

    async fn list_output(&self) -> Result<String> {
        let output = self
            .run(&self.toolchain.device_tool, &["list"])
            .await?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!("{} list", self.toolchain.device_tool.display()),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run(&self, program: &Path, args: &[&str]) -> Result<Output> {
        debug!("$ {} {}", program.display(), args.join(" "));
        let output = Command::new(program).args(args).output().await?;
        if !output.stderr.is_empty() {
            warn!("{}", String::from_utf8_lossy(&output.stderr).trim_end());
        }
        Ok(output)
    }

    async fn run_checked(&self, program: &Path, args: &[&str]) -> Result<()> {
        let output = self.run(program, args).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: format!("{} {}", program.display(), args.join(" ")),
                status: output.status.to_string(),
            })
        }
    }
}
