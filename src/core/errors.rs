use std::path::PathBuf;

use thiserror::Error;

use crate::config::ValidationError;

/// Failure detail for a single engine invocation.
#[derive(Debug, Clone, Error)]
#[error("scan engine failed for {target}: {stderr_tail}")]
pub struct EngineError {
    pub target: String,
    pub arguments: String,
    pub exit_code: Option<i32>,
    pub stderr_tail: String,
}

/// Errors surfaced at the pipeline boundary. Backend and engine failures are
/// contained before they reach this type; what remains is invalid
/// configuration and storage trouble.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("scan results file not found: {}", .path.display())]
    MissingScanFile { path: PathBuf },

    #[error("failed to read scan results from {}: {reason}", .path.display())]
    Storage { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
