//! # Steward Configuration
//!
//! Configuration is resolved once at process start from, lowest to highest
//! precedence:
//!
//! 1. built-in defaults
//! 2. `<vault>/steward.toml`
//! 3. `<vault>/.env` (`KEY=VALUE` lines, never overriding the environment)
//! 4. the process environment
//!
//! Only `DRY_RUN` is taken from the environment layers. Dry-run is on unless
//! explicitly disabled.
//!
//! ```rust,no_run
//! use steward_config::ConfigLoader;
//!
//! # fn main() -> Result<(), steward_config::ConfigError> {
//! let config = ConfigLoader::load("/path/to/vault")?;
//! println!("dry run: {}", config.dry_run);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::*;
