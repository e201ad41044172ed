//! Run Command - inbox watcher and orchestrator side by side
//!
//! Both loops share one task. If either fails to start, the other is asked
//! to stop so the process exits instead of running half a pipeline.

use anyhow::{Context, Result};
use std::path::Path;
use steward_pipeline::Orchestrator;
use steward_watch::InboxWatcher;
use tracing::{error, info};

use super::{open_vault, stop_on_ctrl_c};

/// Execute the run command
pub async fn execute(vault: &Path) -> Result<()> {
    let (layout, config) = open_vault(vault)?;
    info!("Starting full pipeline for {}", layout.root().display());

    let mut watcher = InboxWatcher::new(layout.clone(), config.watch.clone())
        .context("Failed to set up inbox watcher")?
        .with_error_excerpt_chars(config.capability.error_excerpt_chars);
    let mut orchestrator =
        Orchestrator::from_config(layout, &config).context("Failed to set up orchestrator")?;

    let watcher_stop = watcher.stop_handle();
    let orchestrator_stop = orchestrator.stop_handle();
    stop_on_ctrl_c(vec![watcher_stop.clone(), orchestrator_stop.clone()]);

    let watching = async {
        let result = watcher.run().await;
        if let Err(e) = &result {
            error!("Inbox watcher stopped with error: {}", e);
            orchestrator_stop.stop();
        }
        result.context("Inbox watcher failed")
    };
    let orchestrating = async {
        let result = orchestrator.run().await;
        if let Err(e) = &result {
            error!("Orchestrator stopped with error: {}", e);
            watcher_stop.stop();
        }
        result.context("Orchestrator failed")
    };

    let (watched, orchestrated) = tokio::join!(watching, orchestrating);
    watched.and(orchestrated)
}
