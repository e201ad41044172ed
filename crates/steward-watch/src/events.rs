//! File event types and notify conversion.

use chrono::{DateTime, Utc};
use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use std::path::{Path, PathBuf};

/// A file system change seen by a [`DirectoryWatcher`](crate::DirectoryWatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// What happened
    pub kind: FileEventKind,
    /// Path the event refers to (the destination for moves)
    pub path: PathBuf,
    /// When the event was observed
    pub timestamp: DateTime<Utc>,
}

/// Kind of file system change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEventKind {
    /// File was created
    Created,
    /// File content or metadata changed
    Modified,
    /// File was removed or moved out of view
    Deleted,
    /// File was renamed with both ends visible
    Moved {
        /// Previous path
        from: PathBuf,
        /// New path
        to: PathBuf,
    },
    /// Anything else the backend reports
    Unknown(String),
}

impl FileEvent {
    /// Create an event observed now.
    pub fn new(kind: FileEventKind, path: PathBuf) -> Self {
        Self {
            kind,
            path,
            timestamp: Utc::now(),
        }
    }

    /// Path of a file that newly appeared, if this event is an arrival.
    ///
    /// Creations and the destination side of renames count; a file moved into
    /// a watched folder is as new to it as one written there.
    pub fn arrived_path(&self) -> Option<&Path> {
        match &self.kind {
            FileEventKind::Created => Some(&self.path),
            FileEventKind::Moved { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Convert one notify event into zero or more file events.
    pub fn from_notify(event: &notify::Event) -> Vec<FileEvent> {
        let paths = &event.paths;
        match &event.kind {
            EventKind::Create(_) => Self::each(FileEventKind::Created, paths),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
                let from = paths[0].clone();
                let to = paths[1].clone();
                vec![FileEvent::new(
                    FileEventKind::Moved {
                        from,
                        to: to.clone(),
                    },
                    to,
                )]
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                Self::each(FileEventKind::Created, paths)
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                Self::each(FileEventKind::Deleted, paths)
            }
            EventKind::Modify(_) => Self::each(FileEventKind::Modified, paths),
            EventKind::Remove(_) => Self::each(FileEventKind::Deleted, paths),
            other => Self::each(FileEventKind::Unknown(format!("{other:?}")), paths),
        }
    }

    fn each(kind: FileEventKind, paths: &[PathBuf]) -> Vec<FileEvent> {
        paths
            .iter()
            .map(|path| FileEvent::new(kind.clone(), path.clone()))
            .collect()
    }
}
