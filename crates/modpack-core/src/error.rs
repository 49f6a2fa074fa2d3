//! Error types for modpack-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the modpack library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source tree missing or unreadable
    #[error("Source error at {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination cannot be created or written
    #[error("Destination error at {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive entry violates the top-level-folder layout
    #[error("Structural error: {0}")]
    Structural(String),

    /// Embedded manifest missing, unparseable or wrong version
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// ZIP-specific error
    #[error("Zip error: {0}")]
    Zip(String),

    /// Unsupported compression mode
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    /// Invalid file or directory path
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
