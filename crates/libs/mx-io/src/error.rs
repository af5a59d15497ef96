//! Execution error types.

/// Execution errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// Subprocess exited with a failure status.
    #[error("command failed with status {status}: {command}")]
    CommandFailed { command: String, status: String },

    /// Supervised subprocess stalled past its deadline on both attempts.
    #[error("command stalled and was terminated after retry: {command}")]
    HangTimeout { command: String },

    /// Sending a signal to the subprocess failed.
    #[error("failed to signal process: {0}")]
    Signal(#[from] nix::errno::Errno),
}
