//! The orchestrator control loop.

use crate::decision::{Decision, PendingApproval};
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steward_audit::{ActionType, Actor, AuditLog, LogEntry, Outcome};
use steward_config::{StewardConfig, WatchSettings};
use steward_core::vault::{
    APPROVAL_CAPABILITY, BRIEFING_CAPABILITY, DASHBOARD_CAPABILITY, RECORD_EXTENSION,
    TRIAGE_CAPABILITY,
};
use steward_core::VaultLayout;
use steward_skills::{CapabilityInvoker, CapabilityRunner};
use steward_watch::{
    excerpt, DirectoryWatcher, EventFilter, RunState, StopHandle, WorkQueue,
};
use tracing::{debug, error, info, warn};

const ORCHESTRATOR_TARGET: &str = "orchestrator";
const DASHBOARD_TARGET: &str = "Dashboard.md";
const BRIEFING_TARGET: &str = "Briefings/";
const WATCHED_FOLDERS: [&str; 3] = ["Needs_Action/", "Approved/", "Rejected/"];

/// How far a capability sequence got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every call succeeded (or was simulated in dry-run).
    Completed,
    /// The primary capability failed; the sequence was aborted.
    CapabilityFailed,
    /// The primary capability succeeded but the dashboard refresh failed.
    DashboardFailed,
}

/// Counts from one control loop cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Triage items taken from the queue
    pub triage_items: usize,
    /// Decision files taken from the queue
    pub approvals: usize,
    /// Sequences that ended with a failed capability call
    pub capability_failures: usize,
    /// Items that raised an error and were skipped
    pub errors: usize,
}

/// Watches `Needs_Action/`, `Approved/` and `Rejected/` and drives the
/// matching capability sequences.
///
/// Items are processed one at a time on the control loop; a slow capability
/// call delays the next item but never runs concurrently with it. The
/// dry-run flag is fixed at construction.
pub struct Orchestrator {
    layout: VaultLayout,
    audit: AuditLog,
    runner: Arc<dyn CapabilityRunner>,
    dry_run: bool,
    settings: WatchSettings,
    excerpt_chars: usize,
    triage: WorkQueue<PathBuf>,
    approvals: WorkQueue<PendingApproval>,
    needs_action: DirectoryWatcher<PathBuf>,
    approved: DirectoryWatcher<PendingApproval>,
    rejected: DirectoryWatcher<PendingApproval>,
    state: RunState,
}

impl Orchestrator {
    /// Create an orchestrator with an injected capability runner.
    ///
    /// Missing working folders are created; a missing vault root is fatal.
    pub fn new(
        layout: VaultLayout,
        config: &StewardConfig,
        runner: Arc<dyn CapabilityRunner>,
    ) -> Result<Self> {
        layout.ensure_dirs()?;

        let records = EventFilter::new().with_extensions([RECORD_EXTENSION]);
        let triage = WorkQueue::new();
        let approvals = WorkQueue::new();

        let needs_action = DirectoryWatcher::new(
            layout.needs_action(),
            records.clone(),
            |path: PathBuf| {
                info!("Orchestrator detected new item: {}", path.display());
                Some(path)
            },
            triage.clone(),
        )?;
        let approved = DirectoryWatcher::new(
            layout.approved(),
            records.clone(),
            decision_handler(Decision::Approved),
            approvals.clone(),
        )?;
        let rejected = DirectoryWatcher::new(
            layout.rejected(),
            records,
            decision_handler(Decision::Rejected),
            approvals.clone(),
        )?;

        if config.dry_run {
            info!("DRY_RUN mode is ON -- capabilities will NOT be invoked");
        }

        Ok(Self {
            audit: AuditLog::new(layout.logs()),
            layout,
            runner,
            dry_run: config.dry_run,
            settings: config.watch.clone(),
            excerpt_chars: config.capability.error_excerpt_chars,
            triage,
            approvals,
            needs_action,
            approved,
            rejected,
            state: RunState::new(),
        })
    }

    /// Create an orchestrator that runs capabilities as configured.
    pub fn from_config(layout: VaultLayout, config: &StewardConfig) -> Result<Self> {
        let invoker = CapabilityInvoker::from_settings(&config.capability);
        Self::new(layout, config, Arc::new(invoker))
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    /// Staged records waiting for triage.
    pub fn triage_queue(&self) -> &WorkQueue<PathBuf> {
        &self.triage
    }

    /// Decision files waiting to be processed.
    pub fn approval_queue(&self) -> &WorkQueue<PendingApproval> {
        &self.approvals
    }

    /// Handle for stopping [`run`](Self::run) from another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.state.stop_handle()
    }

    /// Queue staged records that have no plan yet.
    ///
    /// Decision folders are included only when `reconcile_decisions` is set,
    /// approved before rejected.
    pub fn startup_scan(&self) -> Result<usize> {
        info!("Orchestrator startup scan of Needs_Action...");
        let layout = &self.layout;
        let mut count = self.needs_action.reconcile(|record| {
            record
                .file_name()
                .and_then(|n| n.to_str())
                .map(|name| !layout.plan_path_for(name).exists())
                .unwrap_or(false)
        })?;

        if self.settings.reconcile_decisions {
            count += self.approved.reconcile(|_| true)?;
            count += self.rejected.reconcile(|_| true)?;
        }

        if count > 0 {
            info!("Startup scan found {} unprocessed item(s)", count);
        } else {
            info!("Startup scan: no unprocessed items");
        }
        Ok(count)
    }

    /// Run the triage sequence for one staged record.
    pub async fn process_triage_item(&self, item: &Path) -> Result<SequenceOutcome> {
        let name = file_name(item)?;
        info!("Processing: {}", name);

        self.audit.append(
            &LogEntry::new(
                ActionType::PlanCreated,
                Actor::Orchestrator,
                name.as_str(),
                self.simulated_or(Outcome::Success),
            )
            .with_param("capability", TRIAGE_CAPABILITY)
            .with_param("dry_run", self.dry_run),
        )?;

        let mut context = vec![item.to_path_buf()];
        let handbook = self.layout.handbook();
        if handbook.exists() {
            context.push(handbook);
        }

        if let Err(e) = self.invoke(TRIAGE_CAPABILITY, &context).await {
            error!("Triage capability failed for {}: {}", name, e);
            self.record_capability_failure(&name, TRIAGE_CAPABILITY, &e)?;
            return Ok(SequenceOutcome::CapabilityFailed);
        }

        self.refresh_dashboard(self.goals_context(), name).await
    }

    /// Run the approval sequence for one decision file.
    pub async fn process_approval(&self, approval: &PendingApproval) -> Result<SequenceOutcome> {
        let name = file_name(&approval.path)?;
        let decision = approval.decision;
        info!("Processing {}: {}", decision, name);

        self.audit.append(
            &LogEntry::new(
                decision.action_type(),
                Actor::Orchestrator,
                name.as_str(),
                self.simulated_or(Outcome::Success),
            )
            .with_param("capability", APPROVAL_CAPABILITY)
            .with_param("decision", decision.as_str())
            .with_param("dry_run", self.dry_run)
            .with_approval(decision.approval_status()),
        )?;

        if let Err(e) = self
            .invoke(APPROVAL_CAPABILITY, std::slice::from_ref(&approval.path))
            .await
        {
            error!("Process-approval capability failed for {}: {}", name, e);
            self.record_capability_failure(&name, APPROVAL_CAPABILITY, &e)?;
            return Ok(SequenceOutcome::CapabilityFailed);
        }

        self.refresh_dashboard(Vec::new(), format!("{decision}:{name}"))
            .await
    }

    /// Drain both queues and process every item, triage first.
    ///
    /// Errors are contained per item: logged, audited, and skipped.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let items = self.triage.drain_all();
        debug!("Triage queue: {:?}", self.triage.stats());
        for item in items {
            report.triage_items += 1;
            match self.process_triage_item(&item).await {
                Ok(SequenceOutcome::Completed) => {}
                Ok(_) => report.capability_failures += 1,
                Err(e) => {
                    report.errors += 1;
                    error!("Error processing {}: {}", item.display(), e);
                    self.record_processing_error(
                        &item,
                        LogEntry::new(
                            ActionType::Error,
                            Actor::Orchestrator,
                            item.display().to_string(),
                            Outcome::Failure,
                        )
                        .with_param("event", "processing_error")
                        .with_param("phase", "triage")
                        .with_param("error", excerpt(&e.to_string(), self.excerpt_chars)),
                    );
                }
            }
        }

        let approvals = self.approvals.drain_all();
        debug!("Approval queue: {:?}", self.approvals.stats());
        for approval in approvals {
            report.approvals += 1;
            match self.process_approval(&approval).await {
                Ok(SequenceOutcome::Completed) => {}
                Ok(_) => report.capability_failures += 1,
                Err(e) => {
                    report.errors += 1;
                    error!("Error processing approval {}: {}", approval.path.display(), e);
                    self.record_processing_error(
                        &approval.path,
                        LogEntry::new(
                            ActionType::Error,
                            Actor::Orchestrator,
                            approval.path.display().to_string(),
                            Outcome::Failure,
                        )
                        .with_param("event", "approval_error")
                        .with_param("decision", approval.decision.as_str())
                        .with_param("error", excerpt(&e.to_string(), self.excerpt_chars)),
                    );
                }
            }
        }

        report
    }

    /// Run until stopped.
    ///
    /// Missing watched folders or a monitor that cannot be attached fail
    /// here, before the loop starts.
    pub async fn run(&mut self) -> Result<()> {
        self.state.start()?;
        if let Err(e) = self.begin() {
            self.stop_monitors();
            self.state.finish();
            return Err(e);
        }

        info!(
            "Orchestrator running (vault={}, interval={}s, dry_run={})",
            self.layout.root().display(),
            self.settings.check_interval_secs,
            self.dry_run
        );
        info!("Watching: {}", WATCHED_FOLDERS.join(", "));

        while self.state.should_continue() {
            self.run_cycle().await;
            self.state.pause(self.settings.check_interval()).await;
        }

        self.stop_monitors();
        self.log_lifecycle(
            LogEntry::new(
                ActionType::Lifecycle,
                Actor::Orchestrator,
                ORCHESTRATOR_TARGET,
                Outcome::Success,
            )
            .with_param("event", "stop"),
        );
        self.state.finish();
        info!("Orchestrator stopped");
        Ok(())
    }

    /// Invoke the briefing capability once with the goals document.
    pub async fn run_briefing(&self) -> Result<SequenceOutcome> {
        info!("Generating briefing...");

        self.audit.append(
            &LogEntry::new(
                ActionType::BriefingGenerated,
                Actor::Orchestrator,
                BRIEFING_TARGET,
                self.simulated_or(Outcome::Success),
            )
            .with_param("capability", BRIEFING_CAPABILITY)
            .with_param("dry_run", self.dry_run),
        )?;

        match self.invoke(BRIEFING_CAPABILITY, &self.goals_context()).await {
            Ok(_) => {
                info!("Briefing generation completed");
                Ok(SequenceOutcome::Completed)
            }
            Err(e) => {
                error!("Briefing generation failed: {}", e);
                self.record_capability_failure(BRIEFING_TARGET, BRIEFING_CAPABILITY, &e)?;
                Ok(SequenceOutcome::CapabilityFailed)
            }
        }
    }

    fn begin(&mut self) -> Result<()> {
        self.startup_scan()?;
        let debounce = self.settings.debounce();
        self.needs_action.start(debounce)?;
        self.approved.start(debounce)?;
        self.rejected.start(debounce)?;

        self.log_lifecycle(
            LogEntry::new(
                ActionType::Lifecycle,
                Actor::Orchestrator,
                ORCHESTRATOR_TARGET,
                Outcome::Success,
            )
            .with_param("event", "start")
            .with_param("dry_run", self.dry_run)
            .with_param("watching", WATCHED_FOLDERS.to_vec()),
        );
        Ok(())
    }

    fn stop_monitors(&mut self) {
        self.needs_action.stop();
        self.approved.stop();
        self.rejected.stop();
    }

    async fn invoke(
        &self,
        capability: &str,
        context: &[PathBuf],
    ) -> std::result::Result<String, steward_skills::CapabilityError> {
        self.runner
            .invoke(
                &self.layout.capability(capability),
                context,
                self.layout.root(),
                self.dry_run,
            )
            .await
    }

    async fn refresh_dashboard(
        &self,
        context: Vec<PathBuf>,
        trigger: String,
    ) -> Result<SequenceOutcome> {
        match self.invoke(DASHBOARD_CAPABILITY, &context).await {
            Err(e) => {
                error!("Dashboard capability failed: {}", e);
                self.record_capability_failure(DASHBOARD_TARGET, DASHBOARD_CAPABILITY, &e)?;
                Ok(SequenceOutcome::DashboardFailed)
            }
            Ok(_) => {
                self.audit.append(
                    &LogEntry::new(
                        ActionType::DashboardUpdated,
                        Actor::Orchestrator,
                        DASHBOARD_TARGET,
                        self.simulated_or(Outcome::Success),
                    )
                    .with_param("trigger", trigger)
                    .with_param("dry_run", self.dry_run),
                )?;
                Ok(SequenceOutcome::Completed)
            }
        }
    }

    fn goals_context(&self) -> Vec<PathBuf> {
        let goals = self.layout.goals();
        if goals.exists() {
            vec![goals]
        } else {
            Vec::new()
        }
    }

    /// `skipped` under dry-run, `outcome` otherwise.
    fn simulated_or(&self, outcome: Outcome) -> Outcome {
        if self.dry_run {
            Outcome::Skipped
        } else {
            outcome
        }
    }

    fn record_capability_failure(
        &self,
        target: &str,
        capability: &str,
        err: &steward_skills::CapabilityError,
    ) -> Result<()> {
        self.audit.append(
            &LogEntry::new(ActionType::Error, Actor::Orchestrator, target, Outcome::Failure)
                .with_param("capability", capability)
                .with_param("error", excerpt(&err.to_string(), self.excerpt_chars)),
        )?;
        Ok(())
    }

    fn record_processing_error(&self, item: &Path, entry: LogEntry) {
        if let Err(e) = self.audit.append(&entry) {
            error!("Failed to record error for {}: {}", item.display(), e);
        }
    }

    fn log_lifecycle(&self, entry: LogEntry) {
        if let Err(e) = self.audit.append(&entry) {
            warn!("Failed to record lifecycle event: {}", e);
        }
    }
}

fn decision_handler(
    decision: Decision,
) -> impl Fn(PathBuf) -> Option<PendingApproval> + Send + Sync + 'static {
    move |path: PathBuf| {
        info!("Orchestrator detected {} file: {}", decision, path.display());
        Some(PendingApproval::new(path, decision))
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PipelineError::InvalidPath(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_rejects_root() {
        assert_eq!(file_name(Path::new("/v/Approved/FILE_a.md")).unwrap(), "FILE_a.md");
        assert!(matches!(
            file_name(Path::new("/")),
            Err(PipelineError::InvalidPath(_))
        ));
    }

    #[test]
    fn decision_handler_tags_paths() {
        let handler = decision_handler(Decision::Rejected);
        let approval = handler(PathBuf::from("/v/Rejected/FILE_a.md")).unwrap();
        assert_eq!(approval.decision, Decision::Rejected);
        assert_eq!(approval.path, PathBuf::from("/v/Rejected/FILE_a.md"));
    }
}
