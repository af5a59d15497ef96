//! MX Builder error types.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] mx_config::error::Error),

    #[error(transparent)]
    Graph(#[from] mx_graph::error::Error),

    #[error(transparent)]
    Exec(#[from] mx_io::error::Error),

    #[error(transparent)]
    Device(#[from] mx_sim::error::Error),

    #[error("no artifact located for project {0}")]
    ArtifactNotFound(String),

    #[error("no test command could be generated: {0}")]
    NoTestCommands(String),

    #[error("test harness reported failures")]
    TestRunFailed,
}
