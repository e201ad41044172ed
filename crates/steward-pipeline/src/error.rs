use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single orchestrator step.
///
/// Capability failures are not errors here; they are reported as a
/// [`SequenceOutcome`](crate::SequenceOutcome) and audited.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Watch(#[from] steward_watch::Error),

    #[error(transparent)]
    Vault(#[from] steward_core::VaultError),

    #[error("Audit error: {0}")]
    Audit(#[from] steward_audit::AuditError),

    #[error("Invalid item path: {0}")]
    InvalidPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
