use anyhow::{bail, Context, Result};
use std::path::Path;
use steward_pipeline::{Orchestrator, SequenceOutcome};

use super::open_vault;

/// Execute the briefing command
pub async fn execute(vault: &Path) -> Result<()> {
    let (layout, config) = open_vault(vault)?;
    let orchestrator =
        Orchestrator::from_config(layout, &config).context("Failed to set up orchestrator")?;

    match orchestrator
        .run_briefing()
        .await
        .context("Failed to record briefing")?
    {
        SequenceOutcome::CapabilityFailed => bail!("Briefing capability failed, see today's log"),
        _ => Ok(()),
    }
}
