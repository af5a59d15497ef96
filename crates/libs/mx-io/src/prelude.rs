//! Common types and utilities.

/// Execution error type.
pub use crate::error::Error;

/// Execution result type.
pub type Result<T> = core::result::Result<T, Error>;
