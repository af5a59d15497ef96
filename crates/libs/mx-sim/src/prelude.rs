//! Common types and utilities.

/// Device lifecycle error type.
pub use crate::error::Error;

/// Device lifecycle result type.
pub type Result<T> = core::result::Result<T, Error>;
