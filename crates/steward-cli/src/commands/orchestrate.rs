use anyhow::{Context, Result};
use std::path::Path;
use steward_pipeline::Orchestrator;
use tracing::info;

use super::{open_vault, stop_on_ctrl_c};

/// Execute the orchestrate command
pub async fn execute(vault: &Path) -> Result<()> {
    let (layout, config) = open_vault(vault)?;
    info!("Starting orchestrator for {}", layout.root().display());

    let mut orchestrator =
        Orchestrator::from_config(layout, &config).context("Failed to set up orchestrator")?;
    stop_on_ctrl_c(vec![orchestrator.stop_handle()]);

    orchestrator.run().await.context("Orchestrator failed")
}
