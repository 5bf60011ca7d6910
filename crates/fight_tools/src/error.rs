//! Error types for the development tools.

use std::path::PathBuf;

use fight_core::error::FightError;
use thiserror::Error;

/// Errors raised while running a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The combat core rejected something.
    #[error(transparent)]
    Core(#[from] FightError),

    /// A scenario script is malformed.
    #[error("Invalid scenario script: {0}")]
    Script(String),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Read a whole file, attaching the path to any error.
///
/// # Errors
///
/// Returns [`ToolError::Io`] if the file cannot be read.
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}
