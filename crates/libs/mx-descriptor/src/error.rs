//! Descriptor parsing error types.

use std::path::PathBuf;

/// Descriptor parsing errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// The given path does not carry the expected descriptor extension.
    #[error("not a solution file: {0}")]
    NotASolution(PathBuf),

    /// The descriptor file does not exist.
    #[error("descriptor not found at: {0}")]
    NotFound(PathBuf),
}
