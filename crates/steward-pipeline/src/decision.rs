use std::fmt;
use std::path::PathBuf;
use steward_audit::{ActionType, ApprovalStatus};

/// Human decision, encoded by the folder a file was dropped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }

    /// Audit action recorded when the decision is picked up.
    pub fn action_type(&self) -> ActionType {
        match self {
            Decision::Approved => ActionType::ApprovalGranted,
            Decision::Rejected => ActionType::ApprovalRejected,
        }
    }

    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            Decision::Approved => ApprovalStatus::Approved,
            Decision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision file waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingApproval {
    pub path: PathBuf,
    pub decision: Decision,
}

impl PendingApproval {
    pub fn new(path: impl Into<PathBuf>, decision: Decision) -> Self {
        Self {
            path: path.into(),
            decision,
        }
    }
}
