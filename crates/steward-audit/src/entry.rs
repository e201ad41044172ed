//! Audit log entries

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A source file was staged (or skipped as a duplicate)
    FileTriage,
    /// The triage capability was started for a staged record
    PlanCreated,
    /// The dashboard capability completed
    DashboardUpdated,
    /// A plan is waiting for a human decision
    ApprovalRequested,
    /// A decision file appeared in `Approved/`
    ApprovalGranted,
    /// A decision file appeared in `Rejected/`
    ApprovalRejected,
    /// The briefing capability was run
    BriefingGenerated,
    /// A file was moved between vault folders
    FileMoved,
    /// A watcher or the orchestrator started or stopped
    Lifecycle,
    /// Something failed
    Error,
}

impl ActionType {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileTriage => "file_triage",
            Self::PlanCreated => "plan_created",
            Self::DashboardUpdated => "dashboard_updated",
            Self::ApprovalRequested => "approval_requested",
            Self::ApprovalGranted => "approval_granted",
            Self::ApprovalRejected => "approval_rejected",
            Self::BriefingGenerated => "briefing_generated",
            Self::FileMoved => "file_moved",
            Self::Lifecycle => "lifecycle",
            Self::Error => "error",
        }
    }
}

/// Who did it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The inbox watcher
    Watcher,
    /// The orchestrator control loop
    Orchestrator,
}

impl Actor {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watcher => "watcher",
            Self::Orchestrator => "orchestrator",
        }
    }
}

/// How it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    Skipped,
}

impl Outcome {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
        }
    }
}

/// Human approval state attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    NotRequired,
    Pending,
    Approved,
    Rejected,
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(ActionType, Actor, Outcome);

/// A single audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UTC, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
    pub action_type: ActionType,
    pub actor: Actor,
    /// Usually a filename
    pub target: String,
    /// Action-specific parameters, in insertion order
    #[serde(default)]
    pub parameters: Map<String, Value>,
    pub result: Outcome,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(
        action_type: ActionType,
        actor: Actor,
        target: impl Into<String>,
        result: Outcome,
    ) -> Self {
        Self::at(Utc::now(), action_type, actor, target, result)
    }

    /// Create an entry with an explicit timestamp.
    pub fn at(
        timestamp: DateTime<Utc>,
        action_type: ActionType,
        actor: Actor,
        target: impl Into<String>,
        result: Outcome,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            action_type,
            actor,
            target: target.into(),
            parameters: Map::new(),
            result,
            approval_status: ApprovalStatus::NotRequired,
        }
    }

    /// Append a parameter. Re-using a key replaces its value in place.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Set the approval status.
    pub fn with_approval(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }

    /// Parameters rendered as `key: value, key: value` for the table row.
    pub fn details(&self) -> String {
        self.parameters
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{key}: {s}"),
                other => format!("{key}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
