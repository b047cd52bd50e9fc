//! Error types for the treeline library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using treeline's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Analysis root does not exist. This is the one failure that is
    /// surfaced to the caller instead of degrading to an issue.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File is not a Python source file.
    #[error("Not a Python source file: {path}")]
    NotPython { path: PathBuf },

    /// Parse error. Recovered below the directory-scan boundary; only
    /// surfaced by the per-file entry points.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Analysis-specific error.
    #[error("Analysis error: {message}")]
    Analysis { message: String },
}

impl Error {
    /// Create a new analysis error.
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
