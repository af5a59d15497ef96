//! Build command generation and artifact collection.
//!
//! Walks a resolved project graph for a requested configuration/platform
//! pair and emits the ordered external build-tool invocations each project
//! needs, then locates the outputs those invocations produced. Generation
//! never executes anything; execution is owned by `mx-io`.

pub mod command;
pub mod generator;
pub mod mdtool;
pub mod msbuild;
pub mod outputs;

pub use command::{BuildCommand, CommandKind, ToolKind};
pub use generator::{BuildRequest, GeneratedCommands, GenerationError, Generator};
pub use outputs::{ArtifactManifest, Collector, ProjectArtifacts};
