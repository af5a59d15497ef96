//! Common types and utilities.

/// Graph error type.
pub use crate::error::Error;

/// Graph result type.
pub type Result<T> = core::result::Result<T, Error>;
