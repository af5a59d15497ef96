//! Subprocess execution for the MX build orchestrator.
//!
//! Two execution modes share one spawning path: plain commands run to
//! completion with their output streamed to the log, while commands targeting
//! the interactive solution build tool run under a hang watchdog that
//! interrupts, force-kills, and retries a stalled process. Commands run one
//! at a time; the watchdog's deadline timer is the only concurrent construct.

pub mod error;
pub mod executor;
pub mod prelude;
pub mod process;

pub use executor::Executor;
