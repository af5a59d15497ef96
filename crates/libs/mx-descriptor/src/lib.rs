//! Descriptor parsing for the MX build orchestrator.
//!
//! Extracts structured facts from solution and project descriptor files with
//! line-oriented scanners. This is deliberately not a general-purpose markup
//! evaluator: only the facts needed to map configurations, classify project
//! roles, and locate build outputs are captured, and any line that matches no
//! probe is ignored.

pub mod api;
pub mod error;
pub mod prelude;
pub mod project;
pub mod solution;

pub use api::{Api, OutputType, TestKind};
pub use project::{ProjectConfigFacts, ProjectFacts};
pub use solution::{ProjectEntry, SolutionFacts};
