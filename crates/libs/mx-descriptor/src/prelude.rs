//! Common types and utilities.

/// Descriptor error type.
pub use crate::error::Error;

/// Descriptor result type.
pub type Result<T> = core::result::Result<T, Error>;
