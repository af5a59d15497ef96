//! Command execution with hang supervision.
//!
//! The interactive solution build tool is known to hang without further
//! output on certain project-graph shapes once it prints its
//! project-loading checkpoint. Supervised execution arms a stall timer when
//! that checkpoint line appears and resets it on any later output line: a
//! liveness check, not a total-runtime cap. A stalled process is interrupted,
//! then force-killed if it ignores the interrupt, and the whole command is
//! retried exactly once.

use crate::prelude::*;
use crate::process;
use std::path::Path;
use std::process::ExitStatus;

use mx_config::WatchdogSettings;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::timeout;
use tracing::{info, warn};

/// Outcome of one supervised attempt.
enum Supervised {
    Completed(ExitStatus),
    Stalled,
}

/// Sequential command executor.
#[derive(Debug, Clone)]
pub struct Executor {
    watchdog: WatchdogSettings,
}

impl Executor {
    pub fn new(watchdog: WatchdogSettings) -> Self {
        Self { watchdog }
    }

    /// Run a command to completion, streaming its output to the log.
    pub async fn execute(&self, program: &Path, args: &[String]) -> Result<()> {
        self.execute_env(program, args, &[]).await
    }

    /// Run a command with extra environment variables.
    pub async fn execute_env(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<()> {
        let command = printable(program, args);
        info!("$ {command}");

        let mut child = process::spawn_process(program, args, envs)?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let out_task = tokio::spawn(async move {
            if let Some(stdout) = stdout {
                drain_lines(stdout, false).await;
            }
        });
        let err_task = tokio::spawn(async move {
            if let Some(stderr) = stderr {
                drain_lines(stderr, true).await;
            }
        });

        let status = child.wait().await?;
        let _ = out_task.await;
        let _ = err_task.await;

        check_status(status, &command)
    }

    /// Run a command under the hang watchdog, retrying once on a stall.
    pub async fn execute_supervised(&self, program: &Path, args: &[String]) -> Result<()> {
        let command = printable(program, args);
        info!("$ {command}");

        match self.supervised_attempt(program, args, &command).await? {
            Supervised::Completed(status) => check_status(status, &command),
            Supervised::Stalled => {
                warn!("command stalled, retrying once: {command}");
                match self.supervised_attempt(program, args, &command).await? {
                    Supervised::Completed(status) => check_status(status, &command),
                    Supervised::Stalled => Err(Error::HangTimeout { command }),
                }
            }
        }
    }

    async fn supervised_attempt(
        &self,
        program: &Path,
        args: &[String],
        command: &str,
    ) -> Result<Supervised> {
        let mut child = process::spawn_process(program, args, &[])?;

        let stderr = child.stderr.take();
        let err_task = tokio::spawn(async move {
            if let Some(stderr) = stderr {
                drain_lines(stderr, true).await;
            }
        });

        let stdout = child.stdout.take();
        let mut lines = BufReader::new(stdout.ok_or_else(|| {
            std::io::Error::other("child stdout was not piped")
        })?)
        .lines();

        // Armed only while the last observed line was the checkpoint: any
        // other line counts as progress and cancels the stall clock.
        let mut armed = false;
        let outcome = loop {
            let next = if armed {
                match timeout(self.watchdog.stall_timeout(), lines.next_line()).await {
                    Ok(read) => read?,
                    Err(_) => {
                        warn!("no output within the stall deadline, interrupting: {command}");
                        self.escalate(&mut child).await?;
                        break Supervised::Stalled;
                    }
                }
            } else {
                lines.next_line().await?
            };

            match next {
                Some(line) => {
                    info!("{line}");
                    armed = line.trim().contains(&self.watchdog.checkpoint);
                }
                None => {
                    let status = child.wait().await?;
                    break Supervised::Completed(status);
                }
            }
        };

        match &outcome {
            // A killed tool may leave grandchildren holding the stderr pipe
            // open; do not wait for them.
            Supervised::Stalled => err_task.abort(),
            Supervised::Completed(_) => {
                let _ = err_task.await;
            }
        }
        Ok(outcome)
    }

    /// Two-stage termination: interrupt, wait out the force deadline, then
    /// force-kill if the process is still alive.
    async fn escalate(&self, child: &mut tokio::process::Child) -> Result<()> {
        process::interrupt_child(child)?;
        match timeout(self.watchdog.force_kill_timeout(), child.wait()).await {
            Ok(waited) => {
                waited?;
            }
            Err(_) => {
                warn!("process ignored the interrupt, force killing");
                process::force_kill_child(child).await?;
            }
        }
        Ok(())
    }
}

fn check_status(status: ExitStatus, command: &str) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: command.to_string(),
            status: status.to_string(),
        })
    }
}

fn printable(program: &Path, args: &[String]) -> String {
    let mut tokens = vec![program.display().to_string()];
    tokens.extend(args.iter().cloned());
    tokens.join(" ")
}

async fn drain_lines<R: AsyncRead + Unpin>(reader: R, is_stderr: bool) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!("{line}");
        } else {
            info!("{line}");
        }
    }
}
