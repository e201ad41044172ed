//! Notify-backed directory watcher.

use crate::{
    error::{Error, Result},
    events::FileEvent,
    filter::EventFilter,
    handler::ArrivalHandler,
    queue::WorkQueue,
};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Watches one folder (non-recursively) and queues every arrival.
///
/// Arrivals are detected two ways: [`reconcile`](Self::reconcile) scans what
/// is already present, and [`start`](Self::start) attaches a debounced notify
/// monitor whose callback runs on its own thread. Both paths go through the
/// same [`EventFilter`] and [`ArrivalHandler`] and push into the same
/// [`WorkQueue`].
pub struct DirectoryWatcher<T: Send + 'static> {
    dir: PathBuf,
    filter: EventFilter,
    handler: Arc<dyn ArrivalHandler<T>>,
    queue: WorkQueue<T>,
    monitor: Option<Debouncer<RecommendedWatcher, RecommendedCache>>,
}

impl<T: Send + 'static> DirectoryWatcher<T> {
    /// Create a watcher for `dir`. The folder must exist.
    pub fn new(
        dir: impl Into<PathBuf>,
        filter: EventFilter,
        handler: impl ArrivalHandler<T>,
        queue: WorkQueue<T>,
    ) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::MissingPath(dir));
        }
        Ok(Self {
            dir,
            filter,
            handler: Arc::new(handler),
            queue,
            monitor: None,
        })
    }

    /// Watched folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queue arrivals are pushed into.
    pub fn queue(&self) -> &WorkQueue<T> {
        &self.queue
    }

    /// Whether the live monitor is attached.
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_some()
    }

    /// Queue files already in the folder that still need processing.
    ///
    /// Candidates are visited in lexicographic order of file name. Returns
    /// how many items were queued.
    pub fn reconcile<F>(&self, needs_processing: F) -> Result<usize>
    where
        F: Fn(&Path) -> bool,
    {
        if !self.dir.is_dir() {
            return Err(Error::MissingPath(self.dir.clone()));
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.filter.accepts(path))
            .collect();
        candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut queued = 0;
        for path in candidates {
            if !needs_processing(&path) {
                debug!("Already processed: {}", path.display());
                continue;
            }
            if let Some(item) = self.handler.on_new_file(path) {
                self.queue.push(item);
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Attach the live monitor.
    pub fn start(&mut self, debounce: Duration) -> Result<()> {
        if self.monitor.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let queue = self.queue.clone();
        let handler = Arc::clone(&self.handler);
        let filter = self.filter.clone();

        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for event in events {
                        for file_event in FileEvent::from_notify(&event.event) {
                            let Some(path) = file_event.arrived_path() else {
                                continue;
                            };
                            if !filter.accepts(path) {
                                continue;
                            }
                            info!("New file detected: {}", path.display());
                            if let Some(item) = handler.on_new_file(path.to_path_buf()) {
                                queue.push(item);
                            }
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        error!("Notify error: {:?}", error);
                    }
                }
            }
        })
        .map_err(|e| Error::Watch(format!("Failed to create directory monitor: {}", e)))?;

        debouncer
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|e| Error::Watch(format!("Failed to watch {}: {}", self.dir.display(), e)))?;

        info!("Watching {}", self.dir.display());
        self.monitor = Some(debouncer);
        Ok(())
    }

    /// Detach the monitor and wait for its thread to finish.
    pub fn stop(&mut self) {
        if let Some(debouncer) = self.monitor.take() {
            debouncer.stop();
            info!("Stopped watching {}", self.dir.display());
        }
    }
}

impl<T: Send + 'static> Drop for DirectoryWatcher<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
