//! Triage and Approval Orchestration
//!
//! Drives external capabilities as records move through the vault:
//!
//! ```text
//! Needs_Action/FILE_x.md ──▶ triage-inbox ──▶ update-dashboard        (planned)
//! Approved/ | Rejected/  ──▶ process-approval ──▶ update-dashboard    (resolved)
//! ```
//!
//! State lives in which folder a file is in. The orchestrator never edits
//! records itself; it detects arrivals, calls the right capability sequence,
//! and writes an audit entry before and after each call.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use steward_pipeline::Orchestrator;
//!
//! let config = ConfigLoader::load(&vault)?;
//! let mut orchestrator = Orchestrator::from_config(VaultLayout::open(&vault)?, &config)?;
//! orchestrator.run().await?;
//! ```

mod decision;
mod error;
mod orchestrator;

pub use decision::{Decision, PendingApproval};
pub use error::{PipelineError, Result};
pub use orchestrator::{CycleReport, Orchestrator, SequenceOutcome};
