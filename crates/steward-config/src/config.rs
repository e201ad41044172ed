//! Configuration types and defaults

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    /// Folder watching and control loop timing
    pub watch: WatchSettings,
    /// External capability invocation
    pub capability: CapabilitySettings,
    /// Simulate capability calls instead of spawning processes
    pub dry_run: bool,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            watch: WatchSettings::default(),
            capability: CapabilitySettings::default(),
            dry_run: true,
        }
    }
}

impl StewardConfig {
    /// Reject values the control loops cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.watch.check_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "watch.check_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.capability.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "capability.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.capability.program.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "capability.program",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Watching and polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Sleep between control loop cycles
    pub check_interval_secs: u64,
    /// Debounce window of the directory monitor
    pub debounce_ms: u64,
    /// Scan `Approved/` and `Rejected/` at orchestrator startup
    pub reconcile_decisions: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: 10,
            debounce_ms: 500,
            reconcile_decisions: false,
        }
    }
}

impl WatchSettings {
    /// Control loop sleep.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Monitor debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// External capability settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySettings {
    /// Executable invoked for every capability call
    pub program: String,
    /// Extra arguments placed before the request
    pub args: Vec<String>,
    /// Operations the external process may perform
    pub allowed_tools: Vec<String>,
    /// Upper bound on a single call
    pub timeout_secs: u64,
    /// Length of error excerpts stored in the audit trail
    pub error_excerpt_chars: usize,
}

impl Default for CapabilitySettings {
    fn default() -> Self {
        Self {
            program: "claude".to_string(),
            args: Vec::new(),
            allowed_tools: ["Edit", "Write", "Read", "Glob", "Grep"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_secs: 300,
            error_excerpt_chars: 200,
        }
    }
}

impl CapabilitySettings {
    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StewardConfig::default();
        assert!(config.dry_run);
        assert_eq!(config.watch.check_interval(), Duration::from_secs(10));
        assert_eq!(config.capability.timeout(), Duration::from_secs(300));
        assert_eq!(config.capability.program, "claude");
        assert_eq!(
            config.capability.allowed_tools,
            vec!["Edit", "Write", "Read", "Glob", "Grep"]
        );
        assert!(!config.watch.reconcile_decisions);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = StewardConfig::default();
        config.watch.check_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "watch.check_interval_secs", .. })
        ));
    }

    #[test]
    fn validate_rejects_blank_program() {
        let mut config = StewardConfig::default();
        config.capability.program = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
