use anyhow::{Context, Result};
use std::path::Path;
use steward_watch::InboxWatcher;
use tracing::info;

use super::{open_vault, stop_on_ctrl_c};

/// Execute the watch command
pub async fn execute(vault: &Path) -> Result<()> {
    let (layout, config) = open_vault(vault)?;
    info!("Starting inbox watcher for {}", layout.root().display());

    let mut watcher = InboxWatcher::new(layout, config.watch)
        .context("Failed to set up inbox watcher")?
        .with_error_excerpt_chars(config.capability.error_excerpt_chars);
    stop_on_ctrl_c(vec![watcher.stop_handle()]);

    watcher.run().await.context("Inbox watcher failed")
}
