//! Low-level async process management utilities.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Stdio;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};

/// Spawn a subprocess with piped stdout and stderr.
pub fn spawn_process(
    program: &Path,
    args: &[String],
    envs: &[(String, String)],
) -> io::Result<Child> {
    Command::new(OsStr::new(program))
        .args(args)
        .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
}

/// Send a graceful interrupt to a child process.
///
/// This is the first escalation stage; the child gets a chance to release
/// its resources before a force kill.
pub fn interrupt_child(child: &Child) -> crate::prelude::Result<()> {
    if let Some(pid) = child.id() {
        signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM)?;
    }
    Ok(())
}

/// Forcefully terminate a child process and reap it.
pub async fn force_kill_child(child: &mut Child) -> io::Result<()> {
    child.kill().await
}
