//! Idempotent staging of inbox files as triage records.

use crate::atomic::{Commit, PendingRecord};
use crate::error::{Error, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use steward_audit::{ActionType, Actor, AuditLog, LogEntry, Outcome};
use steward_core::{classify, record_name_for, VaultItem, VaultLayout};
use tracing::info;

/// What [`Stager::stage`] did with a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// A new record was written.
    Created(PathBuf),
    /// A record for this original name already exists; nothing was written.
    Skipped(PathBuf),
}

impl StageOutcome {
    /// Record path in either case.
    pub fn record(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Skipped(path) => path,
        }
    }
}

/// Creates one `Needs_Action/FILE_<stem>.md` record per original filename.
#[derive(Debug, Clone)]
pub struct Stager {
    layout: VaultLayout,
    audit: AuditLog,
}

impl Stager {
    /// Create a stager writing into `layout` and auditing to `audit`.
    pub fn new(layout: VaultLayout, audit: AuditLog) -> Self {
        Self { layout, audit }
    }

    /// Whether a record for `original_name` already exists.
    pub fn is_duplicate(&self, original_name: &str) -> bool {
        self.layout.record_path_for(original_name).exists()
    }

    /// Stage `source`, or skip it if its record already exists.
    ///
    /// The record is committed atomically and never overwrites an existing
    /// one, so a concurrent stage of the same name also ends up as a skip.
    pub fn stage(&self, source: &Path) -> Result<StageOutcome> {
        let original_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidPath(source.to_path_buf()))?;
        let source_path = self.vault_relative(source);
        let target = self.layout.record_path_for(original_name);

        if target.exists() {
            return self.skip(original_name, &source_path, target);
        }

        let classification = classify(original_name);
        let item = VaultItem::new(
            original_name,
            classification,
            source_path.as_str(),
            Utc::now(),
        );
        let pending =
            PendingRecord::prepare(&self.layout.needs_action(), item.to_markdown().as_bytes())?;

        match pending.commit(&target)? {
            Commit::TargetExists(target) => self.skip(original_name, &source_path, target),
            Commit::Written(target) => {
                let record_name = record_name_for(original_name);
                info!(
                    "Created metadata: {} (type={}, priority={})",
                    record_name, classification.category, classification.priority
                );
                self.audit.append(
                    &LogEntry::new(
                        ActionType::FileTriage,
                        Actor::Watcher,
                        original_name,
                        Outcome::Success,
                    )
                    .with_param("detected_type", classification.category.as_str())
                    .with_param("priority", classification.priority.as_str())
                    .with_param("metadata_file", record_name)
                    .with_param("source_path", source_path),
                )?;
                Ok(StageOutcome::Created(target))
            }
        }
    }

    fn skip(
        &self,
        original_name: &str,
        source_path: &str,
        record: PathBuf,
    ) -> Result<StageOutcome> {
        info!("Duplicate skipped: {} (metadata already exists)", original_name);
        self.audit.append(
            &LogEntry::new(
                ActionType::FileTriage,
                Actor::Watcher,
                original_name,
                Outcome::Skipped,
            )
            .with_param("reason", "duplicate")
            .with_param("source_path", source_path),
        )?;
        Ok(StageOutcome::Skipped(record))
    }

    fn vault_relative(&self, path: &Path) -> String {
        self.layout
            .relative(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
