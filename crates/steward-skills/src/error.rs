use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a capability call did not succeed.
///
/// The `Display` form is what ends up (truncated) in the audit trail.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The configured program is not installed or not on `PATH`.
    #[error("{program} command not found")]
    ExecutableNotFound { program: String },

    /// The call ran past its deadline and was killed.
    #[error("{}", timeout_message(.timeout))]
    TimedOut { timeout: Duration },

    /// The program exited unsuccessfully; carries its error stream.
    #[error("{}", exit_message(.code, .stderr))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// Capability file could not be read.
    #[error("Failed to read capability {path}: {source}")]
    Definition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Capability file has a malformed frontmatter block.
    #[error("Invalid frontmatter in {path}: {source}")]
    InvalidDefinition {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The program could not be started for another reason.
    #[error("Failed to spawn capability process: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading the process output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn timeout_message(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("Timeout after {} seconds", timeout.as_secs())
    } else {
        format!("Timeout after {} ms", timeout.as_millis())
    }
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;
