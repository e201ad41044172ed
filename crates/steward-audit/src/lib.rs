//! Audit trail for Steward
//!
//! Every significant action is recorded in `Logs/YYYY-MM-DD.md`, one file per
//! UTC calendar day. Each entry is written twice on consecutive lines:
//!
//! - a Markdown table row for people reading the vault
//! - an HTML comment carrying the full entry as JSON, for reconstruction
//!
//! ```text
//! | 09:26:53 | file_triage | watcher | invoice_acme.pdf | success | detected_type: invoice, ... |
//! <!-- {"timestamp":"2025-03-14T09:26:53Z","action_type":"file_triage",...} -->
//! ```
//!
//! Files are opened, appended and closed on every call; nothing is ever
//! truncated or rewritten.
//!
//! # Example
//!
//! ```no_run
//! use steward_audit::{ActionType, Actor, AuditLog, LogEntry, Outcome};
//!
//! # fn example() -> Result<(), steward_audit::AuditError> {
//! let log = AuditLog::new("vault/Logs");
//! log.append(
//!     &LogEntry::new(ActionType::FileTriage, Actor::Watcher, "invoice_acme.pdf", Outcome::Success)
//!         .with_param("detected_type", "invoice"),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod entry;
mod error;
pub mod log;
pub mod markdown;

pub use entry::{ActionType, Actor, ApprovalStatus, LogEntry, Outcome};
pub use error::{AuditError, AuditResult};
pub use log::AuditLog;
