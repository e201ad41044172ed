//! # Steward Skills
//!
//! Capabilities are out-of-process units of work described by a Markdown
//! file under `<vault>/skills/`. This crate loads those definitions,
//! assembles the textual request, and runs the external program under a
//! deadline.
//!
//! The orchestrator only sees the [`CapabilityRunner`] trait, so tests and
//! alternative backends can stand in for the subprocess.

pub mod capability;
mod error;
pub mod invoker;
pub mod request;

pub use capability::Capability;
pub use error::{CapabilityError, CapabilityResult};
pub use invoker::{dry_run_message, CapabilityInvoker, CapabilityRunner};
pub use request::build_request;
