use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single pipeline stage.
///
/// Display output is what the caller finally sees, so the extractor's own
/// message is carried through untouched.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Extraction(String),

    #[error("Download verification failed: {} does not exist", .0.display())]
    DownloadVerification(PathBuf),

    #[error("Download failed")]
    MissingSource(PathBuf),

    #[error("{tool} exited with {status}")]
    ProcessFailed { tool: String, status: String },

    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output verification failed: {} does not exist", .0.display())]
    OutputMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while starting or running the server itself
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type alias for pipeline stages
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Result type alias for server setup
pub type Result<T> = std::result::Result<T, ServerError>;
