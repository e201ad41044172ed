//! Inbox watcher: reconcile, monitor and stage every new inbox file.

use crate::{
    error::Result,
    excerpt,
    filter::EventFilter,
    lifecycle::{RunState, StopHandle},
    queue::WorkQueue,
    stager::{StageOutcome, Stager},
    watcher::DirectoryWatcher,
};
use std::path::PathBuf;
use steward_audit::{ActionType, Actor, AuditLog, LogEntry, Outcome};
use steward_config::{CapabilitySettings, WatchSettings};
use steward_core::VaultLayout;
use tracing::{debug, error, info, warn};

const WATCHER_TARGET: &str = "filesystem_watcher";

/// Counts from one control loop cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records written
    pub created: usize,
    /// Duplicates skipped
    pub skipped: usize,
    /// Items that failed
    pub failed: usize,
}

/// Watches `Inbox/` and stages each arrival into `Needs_Action/`.
pub struct InboxWatcher {
    layout: VaultLayout,
    audit: AuditLog,
    stager: Stager,
    queue: WorkQueue<PathBuf>,
    watcher: DirectoryWatcher<PathBuf>,
    state: RunState,
    settings: WatchSettings,
    excerpt_chars: usize,
}

impl InboxWatcher {
    /// Create a watcher for the vault, creating missing working folders.
    pub fn new(layout: VaultLayout, settings: WatchSettings) -> Result<Self> {
        layout.ensure_dirs()?;
        let audit = AuditLog::new(layout.logs());
        let stager = Stager::new(layout.clone(), audit.clone());
        let queue = WorkQueue::new();
        let watcher = DirectoryWatcher::new(
            layout.inbox(),
            EventFilter::new(),
            Some::<PathBuf>,
            queue.clone(),
        )?;

        Ok(Self {
            layout,
            audit,
            stager,
            queue,
            watcher,
            state: RunState::new(),
            settings,
            excerpt_chars: CapabilitySettings::default().error_excerpt_chars,
        })
    }

    /// Length of error excerpts written to the audit trail
    /// (`capability.error_excerpt_chars`).
    pub fn with_error_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    /// Pending inbox files.
    pub fn queue(&self) -> &WorkQueue<PathBuf> {
        &self.queue
    }

    /// Handle for stopping [`run`](Self::run) from another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.state.stop_handle()
    }

    /// Queue every inbox file that has no record yet.
    pub fn startup_scan(&self) -> Result<usize> {
        info!("Running startup scan of Inbox...");
        let stager = &self.stager;
        let count = self.watcher.reconcile(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| !stager.is_duplicate(name))
                .unwrap_or(false)
        })?;

        if count > 0 {
            info!("Startup scan found {} unprocessed file(s)", count);
        } else {
            info!("Startup scan: no unprocessed files");
        }
        Ok(count)
    }

    /// Drain the queue and stage each item. Failures are contained per item.
    pub fn run_cycle(&self) -> CycleReport {
        let batch = self.queue.drain_all();
        debug!("Inbox queue: {:?}", self.queue.stats());

        let mut report = CycleReport::default();
        for path in batch {
            match self.stager.stage(&path) {
                Ok(StageOutcome::Created(record)) => {
                    report.created += 1;
                    info!("Processed: {} -> {}", path.display(), record.display());
                }
                Ok(outcome @ StageOutcome::Skipped(_)) => {
                    report.skipped += 1;
                    debug!("Already staged as {}", outcome.record().display());
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Error processing {}: {}", path.display(), e);
                    self.record_failure(&path, &e.to_string());
                }
            }
        }
        report
    }

    /// Run until stopped.
    ///
    /// A missing inbox or a monitor that cannot be attached fails here,
    /// before the loop starts. Once running, only a stop request ends it.
    pub async fn run(&mut self) -> Result<()> {
        self.state.start()?;
        if let Err(e) = self.begin() {
            self.watcher.stop();
            self.state.finish();
            return Err(e);
        }

        info!(
            "Inbox watcher running (vault={}, interval={}s)",
            self.layout.root().display(),
            self.settings.check_interval_secs
        );

        while self.state.should_continue() {
            self.run_cycle();
            self.state.pause(self.settings.check_interval()).await;
        }

        self.watcher.stop();
        self.log_lifecycle(
            LogEntry::new(ActionType::Lifecycle, Actor::Watcher, WATCHER_TARGET, Outcome::Success)
                .with_param("event", "stop"),
        );
        self.state.finish();
        info!("Inbox watcher stopped");
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        self.startup_scan()?;
        self.watcher.start(self.settings.debounce())?;
        self.log_lifecycle(
            LogEntry::new(ActionType::Lifecycle, Actor::Watcher, WATCHER_TARGET, Outcome::Success)
                .with_param("event", "start")
                .with_param("watching", "Inbox/"),
        );
        Ok(())
    }

    fn log_lifecycle(&self, entry: LogEntry) {
        if let Err(e) = self.audit.append(&entry) {
            warn!("Failed to record lifecycle event: {}", e);
        }
    }

    fn record_failure(&self, path: &std::path::Path, message: &str) {
        let target = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let entry = LogEntry::new(ActionType::Error, Actor::Watcher, target, Outcome::Failure)
            .with_param("event", "processing_error")
            .with_param("error", excerpt(message, self.excerpt_chars));
        if let Err(e) = self.audit.append(&entry) {
            error!("Failed to record processing error: {}", e);
        }
    }
}
