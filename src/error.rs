//! Centralized error types for pstreport.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pstreport library.
#[derive(Error, Debug)]
pub enum PstError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified container file does not exist.
    #[error("Container file not found: {0}")]
    FileNotFound(PathBuf),

    /// The backend rejected the file.
    #[error("Not a valid mailbox container '{path}': {reason}")]
    InvalidContainer { path: PathBuf, reason: String },

    /// No backend is available for this file.
    #[error("Unsupported container format: {0}")]
    UnsupportedContainer(String),

    /// Reading a folder or message property failed.
    #[error("Failed to read field '{field}': {reason}")]
    FieldAccess { field: &'static str, reason: String },

    /// An export operation failed.
    #[error("Export error: {0}")]
    Export(String),
}

/// Convenience alias for `Result<T, PstError>`.
pub type Result<T> = std::result::Result<T, PstError>;

impl PstError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `FieldAccess` variant from any displayable cause.
    pub fn field(field: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::FieldAccess {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `PstError::io`).
impl From<std::io::Error> for PstError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
