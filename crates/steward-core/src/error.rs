//! Error types for vault layout and staged records.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or preparing a vault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The vault root itself does not exist. This is fatal at startup.
    #[error("Vault path does not exist: {0}")]
    MissingRoot(PathBuf),

    /// The vault root exists but is not a directory.
    #[error("Vault path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error while creating working folders.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Folder being prepared
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading a staged record back from disk.
#[derive(Error, Debug)]
pub enum ItemError {
    /// Record does not start with a `---` delimited metadata block.
    #[error("Record has no metadata block")]
    MissingFrontmatter,

    /// Metadata block is not valid YAML for a [`crate::VaultItem`].
    #[error("Invalid record metadata: {0}")]
    Metadata(#[from] serde_yaml::Error),

    /// `detected_date` is not an RFC 3339 timestamp.
    #[error("Invalid detected_date '{value}': {source}")]
    Timestamp {
        /// Raw value found in the record
        value: String,
        /// Parse failure
        #[source]
        source: chrono::ParseError,
    },
}
