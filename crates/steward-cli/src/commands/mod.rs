pub mod briefing;
pub mod orchestrate;
pub mod run;
pub mod watch;

use anyhow::{Context, Result};
use std::path::Path;
use steward_config::{ConfigLoader, StewardConfig};
use steward_core::VaultLayout;
use steward_watch::StopHandle;
use tracing::{info, warn};

/// Open the vault and resolve its configuration.
pub fn open_vault(root: &Path) -> Result<(VaultLayout, StewardConfig)> {
    let layout = VaultLayout::open(root)
        .with_context(|| format!("Cannot open vault at {}", root.display()))?;
    let config = ConfigLoader::load(layout.root())
        .with_context(|| format!("Failed to load configuration for {}", root.display()))?;
    Ok((layout, config))
}

/// Stop every loop behind `handles` on the first Ctrl-C.
pub fn stop_on_ctrl_c(handles: Vec<StopHandle>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping after the current cycle");
                for handle in &handles {
                    handle.stop();
                }
            }
            Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_vault_is_reported_with_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nowhere");
        let err = open_vault(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("nowhere"));
    }

    #[test]
    fn config_is_read_from_vault() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("steward.toml"),
            "[watch]\ncheck_interval_secs = 3\n",
        )
        .unwrap();
        let (layout, config) = open_vault(temp.path()).unwrap();
        assert_eq!(layout.root(), temp.path());
        assert_eq!(config.watch.check_interval_secs, 3);
    }
}
