//! Simulator device lifecycle management.
//!
//! Discovers a named device in the device-listing tool's output and walks it
//! through the deployment sequence: shut every simulator down, erase, boot,
//! install. Every wait is a bounded polling loop against the live tool
//! output (device state is never cached across decisions), and exceeding a
//! deadline is fatal. One lifecycle operation runs at a time per manager;
//! each call blocks until it completes or times out.

pub mod device;
pub mod error;
pub mod manager;
pub mod prelude;

pub use device::{DeviceState, SimDevice};
pub use manager::DeviceManager;
