//! Vault folder contract and derived names.

use crate::error::VaultError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of staged record names in `Needs_Action/`.
pub const RECORD_PREFIX: &str = "FILE_";
/// Prefix of plan artifacts in `Plans/`.
pub const PLAN_PREFIX: &str = "PLAN_";
/// Extension of staged records, plans and decision files.
pub const RECORD_EXTENSION: &str = "md";

/// Capability run against each newly staged record.
pub const TRIAGE_CAPABILITY: &str = "triage-inbox";
/// Capability refreshing the dashboard after triage or approval.
pub const DASHBOARD_CAPABILITY: &str = "update-dashboard";
/// Capability run against each approval decision.
pub const APPROVAL_CAPABILITY: &str = "process-approval";
/// Capability producing the periodic briefing.
pub const BRIEFING_CAPABILITY: &str = "generate-briefing";

/// Folder layout of a vault.
///
/// All working folders are siblings directly under the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    root: PathBuf,
}

impl VaultLayout {
    /// Open a vault rooted at `root`.
    ///
    /// Fails if the root does not exist; working folders are not touched.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        if !root.exists() {
            return Err(VaultError::MissingRoot(root));
        }
        if !root.is_dir() {
            return Err(VaultError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    /// Create any missing working folders under the root.
    pub fn ensure_dirs(&self) -> Result<(), VaultError> {
        for dir in [
            self.inbox(),
            self.needs_action(),
            self.plans(),
            self.approved(),
            self.rejected(),
            self.logs(),
        ] {
            if !dir.is_dir() {
                debug!("Creating vault folder {}", dir.display());
            }
            std::fs::create_dir_all(&dir).map_err(|source| VaultError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Vault root; also the working directory of capability calls.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw input drop folder.
    pub fn inbox(&self) -> PathBuf {
        self.root.join("Inbox")
    }

    /// Staged triage records.
    pub fn needs_action(&self) -> PathBuf {
        self.root.join("Needs_Action")
    }

    /// Downstream plan artifacts.
    pub fn plans(&self) -> PathBuf {
        self.root.join("Plans")
    }

    /// Approval decision drop folder.
    pub fn approved(&self) -> PathBuf {
        self.root.join("Approved")
    }

    /// Rejection decision drop folder.
    pub fn rejected(&self) -> PathBuf {
        self.root.join("Rejected")
    }

    /// Audit trail folder.
    pub fn logs(&self) -> PathBuf {
        self.root.join("Logs")
    }

    /// Capability definitions folder.
    pub fn skills(&self) -> PathBuf {
        self.root.join("skills")
    }

    /// Definition file of the named capability.
    pub fn capability(&self, name: &str) -> PathBuf {
        self.skills().join(format!("{name}.{RECORD_EXTENSION}"))
    }

    /// Reference handbook handed to the triage capability.
    pub fn handbook(&self) -> PathBuf {
        self.root.join("Company_Handbook.md")
    }

    /// Goals document handed to the dashboard and briefing capabilities.
    pub fn goals(&self) -> PathBuf {
        self.root.join("Business_Goals.md")
    }

    /// Dashboard rewritten by the dashboard capability.
    pub fn dashboard(&self) -> PathBuf {
        self.root.join("Dashboard.md")
    }

    /// Path of the staged record for an original filename.
    pub fn record_path_for(&self, original_name: &str) -> PathBuf {
        self.needs_action().join(record_name_for(original_name))
    }

    /// Path of the plan artifact corresponding to a staged record name.
    pub fn plan_path_for(&self, record_name: &str) -> PathBuf {
        self.plans().join(plan_name_for(record_name))
    }

    /// Vault-relative form of `path`, falling back to the path itself.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Derived record name: `FILE_` + stem of the original + `.md`.
///
/// This is the identity used for duplicate detection, so it must stay a
/// pure function of the original filename.
pub fn record_name_for(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| original_name.to_string());
    format!("{RECORD_PREFIX}{stem}.{RECORD_EXTENSION}")
}

/// Plan name for a staged record: the `FILE_` prefix becomes `PLAN_`.
///
/// Names without the record prefix map to themselves.
pub fn plan_name_for(record_name: &str) -> String {
    match record_name.strip_prefix(RECORD_PREFIX) {
        Some(rest) => format!("{PLAN_PREFIX}{rest}"),
        None => record_name.to_string(),
    }
}
