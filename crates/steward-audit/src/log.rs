//! Daily audit log files

use crate::entry::LogEntry;
use crate::error::{AuditError, AuditResult};
use crate::markdown;
use chrono::{Days, NaiveDate, Utc};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of daily log files.
pub const LOG_EXTENSION: &str = "md";

/// Append-only audit trail partitioned by UTC calendar day.
///
/// Holds no file handle between calls, so separate processes can append to
/// the same folder.
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Audit trail stored in `dir` (usually `<vault>/Logs`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Folder holding the daily files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entries of `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}.{LOG_EXTENSION}", date.format("%Y-%m-%d")))
    }

    /// Append an entry to the file of the entry's own UTC date.
    ///
    /// A day's file only becomes visible with its header already in place:
    /// the header is written to a temp file that is linked into place without
    /// replacing an existing file. The table row and the machine line then go
    /// out in a single append.
    pub fn append(&self, entry: &LogEntry) -> AuditResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| AuditError::io(&self.dir, e))?;

        let date = entry.timestamp.date_naive();
        let path = self.path_for(date);
        if !path.exists() {
            self.start_day(date, &path)?;
        }

        let mut record = markdown::table_row(entry);
        record.push_str(&markdown::machine_line(entry)?);

        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| AuditError::io(&path, e))?;
        file.write_all(record.as_bytes())
            .map_err(|e| AuditError::io(&path, e))?;

        debug!(
            "Logged {}: {} -> {} ({})",
            entry.action_type, entry.actor, entry.target, entry.result
        );
        Ok(path)
    }

    fn start_day(&self, date: NaiveDate, path: &Path) -> AuditResult<()> {
        let mut file = tempfile::Builder::new()
            .prefix(".audit-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| AuditError::io(&self.dir, e))?;
        file.write_all(markdown::header(date).as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| AuditError::io(file.path(), e))?;

        match file.persist_noclobber(path) {
            Ok(_) => {
                debug!("Started audit log {}", path.display());
                Ok(())
            }
            // Another writer created the day first
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(AuditError::io(path, e.error)),
        }
    }

    /// All entries of one file, in write order.
    ///
    /// Malformed machine lines are skipped with a warning.
    pub fn read_file(&self, path: &Path) -> AuditResult<Vec<LogEntry>> {
        let file = fs::File::open(path).map_err(|e| AuditError::io(path, e))?;
        let mut entries = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| AuditError::io(path, e))?;
            match markdown::parse_machine_line(&line) {
                Some(Ok(entry)) => entries.push(entry),
                Some(Err(e)) => warn!(
                    "Skipping malformed audit line {} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                ),
                None => {}
            }
        }

        Ok(entries)
    }

    /// All entries of `date`, in write order. A missing file is an empty day.
    pub fn read_day(&self, date: NaiveDate) -> AuditResult<Vec<LogEntry>> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.read_file(&path)
    }

    /// Entries of the last `days` UTC days (today included), newest first.
    ///
    /// Sorting by timestamp is for display only; write order within a file
    /// is the authoritative order.
    pub fn read_recent(&self, days: u64) -> AuditResult<Vec<LogEntry>> {
        let today = Utc::now().date_naive();
        let mut entries = Vec::new();

        for offset in 0..days {
            let Some(date) = today.checked_sub_days(Days::new(offset)) else {
                break;
            };
            entries.extend(self.read_day(date)?);
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }
}
