//! Mapping arrivals to queue items.

use std::path::PathBuf;

/// Turns a newly arrived file into a queue item.
///
/// Called on the monitor thread for live arrivals and on the caller's thread
/// during reconciliation. Returning `None` drops the arrival.
pub trait ArrivalHandler<T>: Send + Sync + 'static {
    /// Handle a file that appeared in the watched folder.
    fn on_new_file(&self, path: PathBuf) -> Option<T>;
}

impl<T, F> ArrivalHandler<T> for F
where
    F: Fn(PathBuf) -> Option<T> + Send + Sync + 'static,
{
    fn on_new_file(&self, path: PathBuf) -> Option<T> {
        self(path)
    }
}
