//! Error types for the af-app service layer.

use std::path::PathBuf;

use af_core::AfError;

/// Application error wrapping the pipeline crates' errors behind one
/// interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] AfError),

    #[error("failed to read workflow config: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("workflow config error: {0}")]
    Config(String),

    #[error("summary serialization error: {0}")]
    Summary(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
