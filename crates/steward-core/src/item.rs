//! Staged metadata records (`Needs_Action/FILE_*.md`).

use crate::classifier::{Category, Classification, Priority};
use crate::error::ItemError;
use crate::frontmatter;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Lifecycle status of a staged record.
///
/// This crate only ever writes `pending`; later states are written by
/// capabilities and are accepted when reading a record back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Freshly staged
    Pending,
    /// A plan exists
    Planned,
    /// A human approved the plan
    Approved,
    /// A human rejected the plan
    Rejected,
    /// Decision carried out
    Resolved,
}

impl ItemStatus {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Planned => "planned",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Resolved => "resolved",
        }
    }
}

/// A staged metadata record for one detected source file.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultItem {
    /// Category from the classifier
    pub category: Category,
    /// Original filename as found in the inbox
    pub original_name: String,
    /// When the file was detected (UTC, second precision)
    pub detected_date: DateTime<Utc>,
    /// Priority from the classifier
    pub priority: Priority,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Vault-relative path of the original file
    pub source_path: String,
}

#[derive(Serialize, Deserialize)]
struct Metadata {
    #[serde(rename = "type")]
    category: Category,
    original_name: String,
    detected_date: String,
    priority: Priority,
    status: ItemStatus,
    source_path: String,
}

impl VaultItem {
    /// Build a `pending` record for a file detected at `detected`.
    pub fn new(
        original_name: impl Into<String>,
        classification: Classification,
        source_path: impl Into<String>,
        detected: DateTime<Utc>,
    ) -> Self {
        use chrono::SubsecRound;
        Self {
            category: classification.category,
            original_name: original_name.into(),
            detected_date: detected.trunc_subsecs(0),
            priority: classification.priority,
            status: ItemStatus::Pending,
            source_path: source_path.into(),
        }
    }

    /// Render the record: metadata block followed by a human-readable body.
    pub fn to_markdown(&self) -> String {
        let metadata = Metadata {
            category: self.category,
            original_name: self.original_name.clone(),
            detected_date: self.detected_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            priority: self.priority,
            status: self.status,
            source_path: self.source_path.clone(),
        };
        // A struct of strings and unit enums always serializes
        let yaml = serde_yaml::to_string(&metadata).unwrap_or_default();

        let mut out = String::with_capacity(yaml.len() + 512);
        out.push_str("---\n");
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n\n");
        let _ = writeln!(out, "## File Details\n");
        let _ = writeln!(out, "Automatically triaged file from Inbox.\n");
        let _ = writeln!(out, "- **Original Name**: {}", self.original_name);
        let _ = writeln!(out, "- **Detected Type**: {}", self.category);
        let _ = writeln!(out, "- **Priority**: {}", self.priority);
        let _ = writeln!(out, "- **Source**: {}\n", self.source_path);
        let _ = writeln!(out, "## Suggested Actions\n");
        let _ = writeln!(out, "- [ ] Review and process this {}", self.category);
        out
    }

    /// Read a record back from its rendered form. The body is ignored.
    pub fn parse(content: &str) -> Result<Self, ItemError> {
        let (block, _body) = frontmatter::split(content).ok_or(ItemError::MissingFrontmatter)?;
        let metadata: Metadata = serde_yaml::from_str(block)?;
        let detected_date = DateTime::parse_from_rfc3339(&metadata.detected_date)
            .map_err(|source| ItemError::Timestamp {
                value: metadata.detected_date.clone(),
                source,
            })?
            .with_timezone(&Utc);

        Ok(Self {
            category: metadata.category,
            original_name: metadata.original_name,
            detected_date,
            priority: metadata.priority,
            status: metadata.status,
            source_path: metadata.source_path,
        })
    }
}
