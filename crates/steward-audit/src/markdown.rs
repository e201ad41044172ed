//! Markdown rendering of the daily audit file
//!
//! The table row is for people; the comment line that follows it is the
//! source of truth for reconstruction.

use crate::entry::LogEntry;
use chrono::NaiveDate;

const MACHINE_PREFIX: &str = "<!-- ";
const MACHINE_SUFFIX: &str = " -->";
const DASHES_ESCAPED: &str = "\\u002d\\u002d";

/// Header written once when a day's file is created.
pub fn header(date: NaiveDate) -> String {
    let date = date.format("%Y-%m-%d");
    format!(
        "---\n\
         type: audit_log\n\
         date: \"{date}\"\n\
         ---\n\
         \n\
         # Audit Log: {date}\n\
         \n\
         | Timestamp | Action | Actor | Target | Result | Details |\n\
         |-----------|--------|-------|--------|--------|---------|\n"
    )
}

/// Escape a value for a table cell: pipes are escaped, line breaks flattened.
pub fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Human-readable table row, newline terminated.
pub fn table_row(entry: &LogEntry) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        entry.timestamp.format("%H:%M:%S"),
        entry.action_type,
        entry.actor,
        escape_cell(&entry.target),
        entry.result,
        escape_cell(&entry.details()),
    )
}

/// Machine-readable line, newline terminated.
///
/// JSON string escaping guarantees the payload holds no line break, so the
/// line can be recovered by prefix/suffix alone. `--` only occurs inside JSON
/// strings and is written as `\u002d\u002d` so the comment cannot end early.
pub fn machine_line(entry: &LogEntry) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(entry)?.replace("--", DASHES_ESCAPED);
    Ok(format!("{MACHINE_PREFIX}{json}{MACHINE_SUFFIX}\n"))
}

/// Recover an entry from a machine-readable line.
///
/// Returns `None` for lines that are not machine lines (header, table rows,
/// unrelated comments) and `Some(Err(..))` for machine lines that fail to
/// parse.
pub fn parse_machine_line(line: &str) -> Option<Result<LogEntry, serde_json::Error>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let payload = line
        .strip_prefix(MACHINE_PREFIX)?
        .strip_suffix(MACHINE_SUFFIX)?;
    if !payload.starts_with('{') {
        return None;
    }
    Some(serde_json::from_str(payload))
}
