//! Arrival filtering.

use std::path::Path;

/// Decides which paths in a watched folder are work.
///
/// Hidden entries (leading `.`) and directories are always ignored; this
/// covers the temporary files written while staging records. An optional
/// extension list narrows things further.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    extensions: Vec<String>,
}

impl EventFilter {
    /// Accept every visible regular file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept files with one of these extensions (case-insensitive).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Whether `path` should be handled.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') || path.is_dir() {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}
