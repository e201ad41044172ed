use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config or `.env` file exists but could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// `steward.toml` is not valid.
    #[error("Invalid configuration file {path}: {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Parse failure
        #[source]
        source: toml::de::Error,
    },

    /// A value is syntactically fine but unusable.
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
