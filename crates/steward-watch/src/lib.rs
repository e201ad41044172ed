//! # Steward Folder Watching
//!
//! Detects new files in vault folders and turns them into queued work.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐  arrivals   ┌─────────────┐   drain    ┌──────────────┐
//! │ DirectoryWatcher │────────────▶│  WorkQueue  │──────────▶│ control loop │
//! │ (notify thread)  │             │ (FIFO, Arc) │  per cycle │ (tokio task) │
//! └──────────────────┘             └─────────────┘            └──────────────┘
//!          ▲                              ▲                          │
//!          │ live events                  │ startup reconciliation   ▼
//!     file system                  DirectoryWatcher::reconcile    Stager / capabilities
//! ```
//!
//! A [`DirectoryWatcher`] is parameterized by an [`ArrivalHandler`] that maps
//! a new file to a queue item, so the inbox (stage the file) and the approval
//! folders (tag the decision) share one watcher type. Items are processed
//! strictly one at a time by whoever drains the queue.
//!
//! The [`InboxWatcher`] is the complete inbox pipeline: reconcile, monitor,
//! and stage every arrival through the [`Stager`] exactly once.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod atomic;
pub mod error;
pub mod events;
pub mod filter;
pub mod handler;
mod inbox;
pub mod lifecycle;
pub mod queue;
pub mod stager;
mod watcher;

pub use atomic::{write_atomically, Commit, PendingRecord};
pub use error::{Error, Result};
pub use events::{FileEvent, FileEventKind};
pub use filter::EventFilter;
pub use handler::ArrivalHandler;
pub use inbox::{CycleReport, InboxWatcher};
pub use lifecycle::{RunState, StopHandle};
pub use queue::{QueueStats, WorkQueue};
pub use stager::{StageOutcome, Stager};
pub use watcher::DirectoryWatcher;

/// Shorten `text` to at most `max_chars` characters for audit parameters.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
