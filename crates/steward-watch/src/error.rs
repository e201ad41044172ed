//! Error types for the folder watching system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while watching folders or staging files.
#[derive(Error, Debug)]
pub enum Error {
    /// Watched folder does not exist. Fatal at startup.
    #[error("Watched path does not exist: {0}")]
    MissingPath(PathBuf),

    /// Directory monitor could not be created or attached.
    #[error("File watching error: {0}")]
    Watch(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path has no usable file name.
    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    /// Watcher or control loop is already running.
    #[error("Watcher is already running")]
    AlreadyRunning,

    /// Vault could not be opened or prepared.
    #[error(transparent)]
    Vault(#[from] steward_core::VaultError),

    /// Audit trail could not be written.
    #[error("Audit error: {0}")]
    Audit(#[from] steward_audit::AuditError),
}

/// Result type for folder watching operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert notify errors to our error type.
impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err.to_string())
    }
}
