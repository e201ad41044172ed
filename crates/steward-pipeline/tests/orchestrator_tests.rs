//! Integration tests for the Orchestrator
//!
//! Most tests inject a recording runner to observe which capabilities are
//! called and in what order; the failure scenario also runs the real
//! subprocess invoker.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steward_audit::{ActionType, ApprovalStatus, AuditLog, LogEntry, Outcome};
use steward_config::{StewardConfig, WatchSettings};
use steward_core::VaultLayout;
use steward_pipeline::{Decision, Orchestrator, PendingApproval, SequenceOutcome};
use steward_skills::{CapabilityError, CapabilityResult, CapabilityRunner};
use steward_watch::{StageOutcome, Stager};
use tempfile::TempDir;

// ============================================================================
// Recording runner
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Call {
    capability: String,
    context: Vec<String>,
    dry_run: bool,
}

#[derive(Clone, Default)]
struct RecordingRunner {
    state: Arc<Mutex<RunnerState>>,
}

#[derive(Default)]
struct RunnerState {
    calls: Vec<Call>,
    failing: HashSet<String>,
}

impl RecordingRunner {
    fn new() -> Self {
        Self::default()
    }

    fn fail(&self, capability: &str) {
        self.state.lock().unwrap().failing.insert(capability.to_string());
    }

    fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn capabilities(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.capability).collect()
    }
}

fn name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

#[async_trait]
impl CapabilityRunner for RecordingRunner {
    async fn invoke(
        &self,
        capability: &Path,
        context: &[PathBuf],
        _working_dir: &Path,
        dry_run: bool,
    ) -> CapabilityResult<String> {
        let capability = capability.file_stem().unwrap().to_string_lossy().into_owned();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            capability: capability.clone(),
            context: context.iter().map(|p| name(p)).collect(),
            dry_run,
        });
        if state.failing.contains(&capability) {
            return Err(CapabilityError::NonZeroExit {
                code: Some(1),
                stderr: format!("{capability} exploded"),
            });
        }
        Ok("done".to_string())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn config(dry_run: bool) -> StewardConfig {
    StewardConfig {
        watch: WatchSettings {
            check_interval_secs: 1,
            debounce_ms: 100,
            reconcile_decisions: false,
        },
        dry_run,
        ..StewardConfig::default()
    }
}

fn vault() -> (TempDir, VaultLayout) {
    let temp = TempDir::new().unwrap();
    let layout = VaultLayout::open(temp.path()).unwrap();
    layout.ensure_dirs().unwrap();
    std::fs::create_dir_all(layout.skills()).unwrap();
    (temp, layout)
}

fn orchestrator(
    layout: &VaultLayout,
    config: &StewardConfig,
    runner: &RecordingRunner,
) -> Orchestrator {
    Orchestrator::new(layout.clone(), config, Arc::new(runner.clone())).unwrap()
}

fn stage(layout: &VaultLayout, record: &str) -> PathBuf {
    let path = layout.needs_action().join(record);
    std::fs::write(&path, "---\ntype: invoice\nstatus: pending\n---\n").unwrap();
    path
}

fn entries(layout: &VaultLayout) -> Vec<LogEntry> {
    let log = AuditLog::new(layout.logs());
    let mut files: Vec<PathBuf> = std::fs::read_dir(layout.logs())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
        .iter()
        .flat_map(|f| log.read_file(f).unwrap())
        .collect()
}

fn actions(layout: &VaultLayout) -> Vec<(ActionType, Outcome)> {
    entries(layout)
        .into_iter()
        .map(|e| (e.action_type, e.result))
        .collect()
}

// ============================================================================
// Triage sequence
// ============================================================================

#[tokio::test]
async fn test_triage_runs_triage_then_dashboard() {
    let (_temp, layout) = vault();
    std::fs::write(layout.handbook(), "rules").unwrap();
    std::fs::write(layout.goals(), "goals").unwrap();
    let runner = RecordingRunner::new();
    let orchestrator = orchestrator(&layout, &config(false), &runner);
    let item = stage(&layout, "FILE_invoice_acme.md");

    let outcome = orchestrator.process_triage_item(&item).await.unwrap();
    assert_eq!(outcome, SequenceOutcome::Completed);

    assert_eq!(
        runner.calls(),
        vec![
            Call {
                capability: "triage-inbox".into(),
                context: vec!["FILE_invoice_acme.md".into(), "Company_Handbook.md".into()],
                dry_run: false,
            },
            Call {
                capability: "update-dashboard".into(),
                context: vec!["Business_Goals.md".into()],
                dry_run: false,
            },
        ]
    );

    let log = entries(&layout);
    assert_eq!(
        actions(&layout),
        vec![
            (ActionType::PlanCreated, Outcome::Success),
            (ActionType::DashboardUpdated, Outcome::Success),
        ]
    );
    assert_eq!(log[0].target, "FILE_invoice_acme.md");
    assert_eq!(log[0].parameters["capability"], "triage-inbox");
    assert_eq!(log[1].parameters["trigger"], "FILE_invoice_acme.md");
}

#[tokio::test]
async fn test_missing_reference_documents_are_left_out() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let orchestrator = orchestrator(&layout, &config(false), &runner);
    let item = stage(&layout, "FILE_a.md");

    orchestrator.process_triage_item(&item).await.unwrap();
    let calls = runner.calls();
    assert_eq!(calls[0].context, vec!["FILE_a.md"]);
    assert!(calls[1].context.is_empty());
}

#[tokio::test]
async fn test_triage_failure_skips_dashboard() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    runner.fail("triage-inbox");
    let orchestrator = orchestrator(&layout, &config(false), &runner);
    let item = stage(&layout, "FILE_a.md");

    let outcome = orchestrator.process_triage_item(&item).await.unwrap();
    assert_eq!(outcome, SequenceOutcome::CapabilityFailed);
    assert_eq!(runner.capabilities(), vec!["triage-inbox"]);

    let log = entries(&layout);
    assert_eq!(
        actions(&layout),
        vec![
            (ActionType::PlanCreated, Outcome::Success),
            (ActionType::Error, Outcome::Failure),
        ]
    );
    assert_eq!(log[1].target, "FILE_a.md");
    assert_eq!(log[1].parameters["error"], "triage-inbox exploded");
}

#[tokio::test]
async fn test_dashboard_failure_does_not_fail_triage() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    runner.fail("update-dashboard");
    let orchestrator = orchestrator(&layout, &config(false), &runner);
    let item = stage(&layout, "FILE_a.md");

    let outcome = orchestrator.process_triage_item(&item).await.unwrap();
    assert_eq!(outcome, SequenceOutcome::DashboardFailed);

    let log = entries(&layout);
    let errors: Vec<_> = log
        .iter()
        .filter(|e| e.action_type == ActionType::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].target, "Dashboard.md");
    assert_eq!(errors[0].parameters["capability"], "update-dashboard");
}

/// Non-zero exit from the real subprocess: error logged, no dashboard call
#[cfg(unix)]
#[tokio::test]
async fn test_failing_subprocess_aborts_sequence() {
    let (_temp, layout) = vault();
    std::fs::write(layout.capability("triage-inbox"), "Triage it.").unwrap();
    std::fs::write(layout.capability("update-dashboard"), "Refresh.").unwrap();

    let mut config = config(false);
    config.capability.program = "false".to_string();
    let orchestrator = Orchestrator::from_config(layout.clone(), &config).unwrap();
    let item = stage(&layout, "FILE_invoice_acme.md");

    let outcome = orchestrator.process_triage_item(&item).await.unwrap();
    assert_eq!(outcome, SequenceOutcome::CapabilityFailed);

    let log = entries(&layout);
    assert_eq!(
        actions(&layout),
        vec![
            (ActionType::PlanCreated, Outcome::Success),
            (ActionType::Error, Outcome::Failure),
        ]
    );
    assert_eq!(log[1].parameters["capability"], "triage-inbox");
    assert!(log
        .iter()
        .all(|e| e.action_type != ActionType::DashboardUpdated && e.target != "Dashboard.md"));
}

#[tokio::test]
async fn test_dry_run_marks_entries_skipped() {
    let (_temp, layout) = vault();
    let mut config = config(true);
    config.capability.program = "/not/installed/anywhere".to_string();
    let orchestrator = Orchestrator::from_config(layout.clone(), &config).unwrap();
    assert!(orchestrator.dry_run());
    let item = stage(&layout, "FILE_a.md");

    let outcome = orchestrator.process_triage_item(&item).await.unwrap();
    assert_eq!(outcome, SequenceOutcome::Completed);
    assert_eq!(
        actions(&layout),
        vec![
            (ActionType::PlanCreated, Outcome::Skipped),
            (ActionType::DashboardUpdated, Outcome::Skipped),
        ]
    );
    assert_eq!(entries(&layout)[0].parameters["dry_run"], true);
}

// ============================================================================
// Approval sequence
// ============================================================================

#[tokio::test]
async fn test_approval_is_logged_before_invoking() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let orchestrator = orchestrator(&layout, &config(false), &runner);
    let file = layout.approved().join("FILE_a.md");
    std::fs::write(&file, "approve").unwrap();

    let outcome = orchestrator
        .process_approval(&PendingApproval::new(&file, Decision::Approved))
        .await
        .unwrap();
    assert_eq!(outcome, SequenceOutcome::Completed);

    assert_eq!(
        runner.calls(),
        vec![
            Call {
                capability: "process-approval".into(),
                context: vec!["FILE_a.md".into()],
                dry_run: false,
            },
            Call {
                capability: "update-dashboard".into(),
                context: vec![],
                dry_run: false,
            },
        ]
    );

    let log = entries(&layout);
    assert_eq!(log[0].action_type, ActionType::ApprovalGranted);
    assert_eq!(log[0].approval_status, ApprovalStatus::Approved);
    assert_eq!(log[0].parameters["decision"], "approved");
    assert_eq!(log[1].action_type, ActionType::DashboardUpdated);
    assert_eq!(log[1].parameters["trigger"], "approved:FILE_a.md");
}

#[tokio::test]
async fn test_rejection_failure_aborts_sequence() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    runner.fail("process-approval");
    let orchestrator = orchestrator(&layout, &config(false), &runner);
    let file = layout.rejected().join("FILE_b.md");
    std::fs::write(&file, "reject").unwrap();

    let outcome = orchestrator
        .process_approval(&PendingApproval::new(&file, Decision::Rejected))
        .await
        .unwrap();
    assert_eq!(outcome, SequenceOutcome::CapabilityFailed);
    assert_eq!(runner.capabilities(), vec!["process-approval"]);

    let log = entries(&layout);
    assert_eq!(log[0].action_type, ActionType::ApprovalRejected);
    assert_eq!(log[0].approval_status, ApprovalStatus::Rejected);
    assert_eq!(log[1].action_type, ActionType::Error);
    assert_eq!(log.len(), 2);
}

// ============================================================================
// Reconciliation and the control loop
// ============================================================================

#[test]
fn test_startup_scan_skips_planned_records() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let orchestrator = orchestrator(&layout, &config(false), &runner);

    stage(&layout, "FILE_c.md");
    stage(&layout, "FILE_a.md");
    stage(&layout, "FILE_b.md");
    std::fs::write(layout.plans().join("PLAN_b.md"), "plan").unwrap();
    std::fs::write(layout.needs_action().join("notes.txt"), "x").unwrap();
    std::fs::write(layout.needs_action().join(".FILE_tmp.md"), "x").unwrap();
    std::fs::write(layout.approved().join("FILE_z.md"), "x").unwrap();

    assert_eq!(orchestrator.startup_scan().unwrap(), 2);
    assert_eq!(
        orchestrator.triage_queue().drain_all(),
        vec![
            layout.needs_action().join("FILE_a.md"),
            layout.needs_action().join("FILE_c.md"),
        ]
    );
    assert!(orchestrator.approval_queue().is_empty());
}

#[test]
fn test_decision_reconciliation_is_opt_in() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let mut config = config(false);
    config.watch.reconcile_decisions = true;
    let orchestrator = orchestrator(&layout, &config, &runner);

    std::fs::write(layout.rejected().join("FILE_a.md"), "x").unwrap();
    std::fs::write(layout.approved().join("FILE_b.md"), "x").unwrap();

    assert_eq!(orchestrator.startup_scan().unwrap(), 2);
    assert_eq!(
        orchestrator.approval_queue().drain_all(),
        vec![
            PendingApproval::new(layout.approved().join("FILE_b.md"), Decision::Approved),
            PendingApproval::new(layout.rejected().join("FILE_a.md"), Decision::Rejected),
        ]
    );
}

#[tokio::test]
async fn test_cycle_contains_item_errors() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let orchestrator = orchestrator(&layout, &config(false), &runner);

    orchestrator.triage_queue().push(PathBuf::from("/"));
    orchestrator.triage_queue().push(stage(&layout, "FILE_a.md"));

    let report = orchestrator.run_cycle().await;
    assert_eq!(report.triage_items, 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.capability_failures, 0);
    assert_eq!(runner.capabilities(), vec!["triage-inbox", "update-dashboard"]);

    let log = entries(&layout);
    assert_eq!(log[0].action_type, ActionType::Error);
    assert_eq!(log[0].parameters["event"], "processing_error");
    assert_eq!(log[0].parameters["phase"], "triage");
    assert!(orchestrator.triage_queue().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_detects_new_records_and_decisions() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let mut orchestrator = orchestrator(&layout, &config(false), &runner);
    let stop = orchestrator.stop_handle();

    let driver = {
        let layout = layout.clone();
        let runner = runner.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            stage(&layout, "FILE_live.md");
            std::fs::write(layout.approved().join("FILE_ok.md"), "yes").unwrap();

            let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
            while runner.calls().len() < 4 && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            stop.stop();
        }
    };

    let (result, ()) = tokio::join!(orchestrator.run(), driver);
    result.unwrap();

    let capabilities = runner.capabilities();
    assert!(capabilities.contains(&"triage-inbox".to_string()));
    assert!(capabilities.contains(&"process-approval".to_string()));

    let lifecycle: Vec<_> = entries(&layout)
        .into_iter()
        .filter(|e| e.action_type == ActionType::Lifecycle)
        .map(|e| e.parameters["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(lifecycle, vec!["start", "stop"]);
}

/// The Stager commits records by renaming a temp file into Needs_Action/;
/// the live watch must treat that rename as exactly one arrival.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_sees_records_committed_by_the_stager() {
    let (_temp, layout) = vault();
    let runner = RecordingRunner::new();
    let mut orchestrator = orchestrator(&layout, &config(false), &runner);
    let stop = orchestrator.stop_handle();

    let source = layout.inbox().join("invoice_acme.pdf");
    std::fs::write(&source, b"%PDF").unwrap();
    let stager = Stager::new(layout.clone(), AuditLog::new(layout.logs()));

    let driver = {
        let runner = runner.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let outcome = stager.stage(&source).unwrap();
            assert!(matches!(outcome, StageOutcome::Created(_)));
            assert_eq!(name(outcome.record()), "FILE_invoice_acme.md");

            let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
            while runner.calls().len() < 2 && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            // One more full cycle, so a second arrival would be picked up
            tokio::time::sleep(Duration::from_millis(1500)).await;
            stop.stop();
        }
    };

    let (result, ()) = tokio::join!(orchestrator.run(), driver);
    result.unwrap();

    let triage: Vec<Call> = runner
        .calls()
        .into_iter()
        .filter(|c| c.capability == "triage-inbox")
        .collect();
    assert_eq!(triage.len(), 1);
    assert_eq!(triage[0].context, vec!["FILE_invoice_acme.md"]);
}

#[tokio::test]
async fn test_briefing_uses_goals() {
    let (_temp, layout) = vault();
    std::fs::write(layout.goals(), "Grow revenue").unwrap();
    let runner = RecordingRunner::new();
    let orchestrator = orchestrator(&layout, &config(false), &runner);

    let outcome = orchestrator.run_briefing().await.unwrap();
    assert_eq!(outcome, SequenceOutcome::Completed);
    assert_eq!(
        runner.calls(),
        vec![Call {
            capability: "generate-briefing".into(),
            context: vec!["Business_Goals.md".into()],
            dry_run: false,
        }]
    );
    assert_eq!(
        actions(&layout),
        vec![(ActionType::BriefingGenerated, Outcome::Success)]
    );
}
