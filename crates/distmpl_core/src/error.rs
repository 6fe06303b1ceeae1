//! Error types for the core module.

use thiserror::Error;

use crate::plugin::Phase;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while collecting files or running the pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("File finder not found: {0}")]
    FinderNotFound(String),

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Plugin {plugin} failed during {phase}: {source}")]
    PhaseFailed {
        plugin: String,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
