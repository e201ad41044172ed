//! # Steward Core
//!
//! Shared vocabulary for the Steward triage pipeline:
//!
//! - [`VaultLayout`] - the folder contract of a vault (`Inbox/`, `Needs_Action/`,
//!   `Plans/`, `Approved/`, `Rejected/`, `Logs/`, `skills/`)
//! - [`VaultItem`] - the staged metadata record written for every detected file
//! - [`classify`] - ordered, first-match-wins filename classification
//!
//! Nothing in this crate watches folders or spawns processes; see
//! `steward-watch` and `steward-pipeline` for that.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod classifier;
mod error;
pub mod frontmatter;
pub mod item;
pub mod vault;

pub use classifier::{classify, Category, Classification, Priority};
pub use error::{ItemError, VaultError};
pub use item::{ItemStatus, VaultItem};
pub use vault::{plan_name_for, record_name_for, VaultLayout};
