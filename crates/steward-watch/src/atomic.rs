//! All-or-nothing record writes.
//!
//! A record is written to a hidden temporary file in the destination folder,
//! flushed, and then linked into place without replacing anything. Readers
//! and the reconciliation scan therefore never observe a partial record:
//! either the final name exists with complete contents or it does not exist.
//! A crash before [`PendingRecord::commit`] leaves at most a hidden temporary
//! file behind, which the [`EventFilter`](crate::EventFilter) ignores.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, PersistError};

/// Prefix of in-flight temporary files.
pub const TEMP_PREFIX: &str = ".staging-";

/// Result of committing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// The record now exists at this path.
    Written(PathBuf),
    /// Another writer got there first; nothing was changed.
    TargetExists(PathBuf),
}

/// Fully written record waiting to be given its final name.
///
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct PendingRecord {
    file: NamedTempFile,
}

impl PendingRecord {
    /// Write `contents` to a temporary file inside `dir` and flush it to disk.
    pub fn prepare(dir: &Path, contents: &[u8]) -> io::Result<Self> {
        let mut file = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(dir)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        Ok(Self { file })
    }

    /// Location of the temporary file.
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Give the record its final name unless `target` already exists.
    pub fn commit(self, target: &Path) -> io::Result<Commit> {
        match self.file.persist_noclobber(target) {
            Ok(_) => Ok(Commit::Written(target.to_path_buf())),
            Err(PersistError { error, file }) => {
                drop(file);
                if error.kind() == io::ErrorKind::AlreadyExists {
                    Ok(Commit::TargetExists(target.to_path_buf()))
                } else {
                    Err(error)
                }
            }
        }
    }
}

/// Write `contents` to `target` atomically, never replacing an existing file.
pub fn write_atomically(target: &Path, contents: &[u8]) -> io::Result<Commit> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    PendingRecord::prepare(dir, contents)?.commit(target)
}
