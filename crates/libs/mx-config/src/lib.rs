//! Configuration types for the MX build orchestrator.
//!
//! Every external tool location and every deadline used by the executor and
//! the device lifecycle manager is an injected value carried by [`MxConfig`],
//! so the orchestrator can be pointed at fake executables under test.

pub mod error;
pub mod prelude;
pub mod toolchain;

pub use toolchain::{DeviceSettings, MxConfig, Toolchain, WatchdogSettings};
