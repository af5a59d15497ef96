//! Device lifecycle error types.

/// Device lifecycle errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// The requested device is not present in the listing.
    #[error("no device found for os version ({os_version}) and name ({device})")]
    DeviceNotFound { device: String, os_version: String },

    /// No runtime version available to resolve a `latest` request.
    #[error("no runtime version found for platform {0}")]
    NoRuntimeVersion(String),

    /// Devices did not all reach Shutdown within the deadline.
    #[error("timed out waiting for simulators to shut down")]
    ShutdownTimeout,

    /// The device did not answer within the boot deadline.
    #[error("timed out waiting for device {0} to boot")]
    BootTimeout(String),

    /// A device tool invocation exited with a failure status.
    #[error("device command failed with status {status}: {command}")]
    CommandFailed { command: String, status: String },
}
