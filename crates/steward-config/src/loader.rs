//! Configuration loading from file, `.env` and environment

use crate::config::StewardConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::{debug, info};

/// Configuration file name inside the vault root.
pub const CONFIG_FILE: &str = "steward.toml";
/// Dotenv file name inside the vault root.
pub const DOTENV_FILE: &str = ".env";
/// Environment variable controlling dry-run.
pub const DRY_RUN_VAR: &str = "DRY_RUN";

/// Interpret a `DRY_RUN` value.
///
/// `true`, `1` and `yes` (any case) enable dry-run, any other present value
/// disables it, and an absent value keeps the safe default (enabled).
pub fn dry_run_from(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
    }
}

/// Loads [`StewardConfig`] for a vault.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve configuration for the vault at `vault_root`.
    pub fn load(vault_root: impl AsRef<Path>) -> ConfigResult<StewardConfig> {
        let root = vault_root.as_ref();

        let config_path = root.join(CONFIG_FILE);
        let file = read_optional(&config_path)?;
        let dotenv = read_optional(&root.join(DOTENV_FILE))?;
        let env_value = std::env::var(DRY_RUN_VAR).ok();

        let config = Self::from_sources(
            file.as_deref().map(|content| (config_path.as_path(), content)),
            dotenv.as_deref(),
            env_value.as_deref(),
        )?;

        if config.dry_run {
            info!("DRY_RUN mode is ON -- capabilities will NOT be invoked");
        } else {
            info!("DRY_RUN mode is OFF -- capabilities WILL be invoked");
        }
        Ok(config)
    }

    /// Parse a `steward.toml` document on its own.
    pub fn from_toml_str(content: &str) -> ConfigResult<StewardConfig> {
        Self::from_sources(Some((Path::new(CONFIG_FILE), content)), None, None)
    }

    /// Combine the layers. `env_dry_run` wins over `dotenv`, which wins over
    /// the file.
    pub fn from_sources(
        file: Option<(&Path, &str)>,
        dotenv: Option<&str>,
        env_dry_run: Option<&str>,
    ) -> ConfigResult<StewardConfig> {
        let mut config = match file {
            Some((path, content)) => {
                debug!("Loading configuration from {}", path.display());
                toml::from_str::<StewardConfig>(content).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => StewardConfig::default(),
        };

        let dotenv_dry_run = dotenv.and_then(|content| dotenv_value(content, DRY_RUN_VAR));
        if let Some(value) = env_dry_run.or(dotenv_dry_run.as_deref()) {
            config.dry_run = dry_run_from(Some(value));
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_optional(path: &Path) -> ConfigResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Last assignment of `key` in dotenv-formatted `content`.
///
/// Supports `KEY=value`, `export KEY=value`, surrounding quotes, blank lines
/// and `#` comments.
fn dotenv_value(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| unquote(v.trim()).to_string())
        })
        .last()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn truthy_values() {
        for v in ["true", "TRUE", "1", "yes", "Yes", " true "] {
            assert!(dry_run_from(Some(v)), "{v} should enable dry-run");
        }
        for v in ["false", "0", "no", "off", ""] {
            assert!(!dry_run_from(Some(v)), "{v} should disable dry-run");
        }
        assert!(dry_run_from(None));
    }

    #[test]
    fn dotenv_parsing() {
        let content = "# comment\n\nOTHER=1\nexport DRY_RUN=\"false\"\n";
        assert_eq!(dotenv_value(content, "DRY_RUN").as_deref(), Some("false"));
        assert_eq!(dotenv_value("DRY_RUN=yes\nDRY_RUN=no\n", "DRY_RUN").as_deref(), Some("no"));
        assert_eq!(dotenv_value("NOPE=1", "DRY_RUN"), None);
    }

    #[test]
    fn layer_precedence() {
        let file = "dry_run = true\n";
        let path = Path::new(CONFIG_FILE);

        let config =
            ConfigLoader::from_sources(Some((path, file)), Some("DRY_RUN=false"), None).unwrap();
        assert!(!config.dry_run, ".env overrides file");

        let config =
            ConfigLoader::from_sources(Some((path, file)), Some("DRY_RUN=false"), Some("1"))
                .unwrap();
        assert!(config.dry_run, "environment overrides .env");

        let config = ConfigLoader::from_sources(None, None, None).unwrap();
        assert!(config.dry_run, "default is dry-run");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::from_toml_str(concat!(
            "[watch]\ncheck_interval_secs = 2\n\n",
            "[capability]\nprogram = \"/usr/local/bin/agent\"\ntimeout_secs = 60\n",
        ))
        .unwrap();
        assert_eq!(config.watch.check_interval_secs, 2);
        assert_eq!(config.watch.debounce_ms, 500);
        assert_eq!(config.capability.program, "/usr/local/bin/agent");
        assert_eq!(config.capability.timeout_secs, 60);
        assert_eq!(config.capability.allowed_tools.len(), 5);
    }

    #[test]
    fn invalid_file_is_reported() {
        let err = ConfigLoader::from_toml_str("[watch\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = ConfigLoader::from_toml_str("[watch]\ncheck_interval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    #[serial]
    fn load_reads_vault_files_and_environment() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            "[watch]\ncheck_interval_secs = 3\n",
        )
        .unwrap();
        std::fs::write(temp.path().join(DOTENV_FILE), "DRY_RUN=false\n").unwrap();

        std::env::remove_var(DRY_RUN_VAR);
        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config.watch.check_interval_secs, 3);
        assert!(!config.dry_run);

        std::env::set_var(DRY_RUN_VAR, "yes");
        let config = ConfigLoader::load(temp.path()).unwrap();
        std::env::remove_var(DRY_RUN_VAR);
        assert!(config.dry_run);
    }

    #[test]
    #[serial]
    fn load_without_any_files_defaults_to_dry_run() {
        let temp = TempDir::new().unwrap();
        std::env::remove_var(DRY_RUN_VAR);
        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config, StewardConfig::default());
    }
}
