//! Common types and utilities.

/// MX Builder error type.
pub use crate::error::Error;

/// MX Builder result type.
pub type Result<T> = core::result::Result<T, Error>;
