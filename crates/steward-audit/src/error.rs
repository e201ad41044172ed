use std::path::PathBuf;
use thiserror::Error;

/// Errors from writing or reading the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error on audit log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AuditError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
