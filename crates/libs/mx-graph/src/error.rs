//! Graph resolution error types.

/// Graph resolution errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// Solution descriptor could not be read.
    #[error(transparent)]
    Descriptor(#[from] mx_descriptor::error::Error),
}
