use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "steward")]
#[command(about = "steward - triage files dropped into a vault and drive capability runs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root directory
    #[arg(long, global = true, env = "STEWARD_VAULT", default_value = ".")]
    pub vault: PathBuf,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, RUST_LOG is used, falling back to 'info'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Level requested on the command line, if any. `--log-level` wins over
    /// `--verbose`.
    pub fn level_override(&self) -> Option<LevelFilter> {
        match (self.log_level, self.verbose) {
            (Some(level), _) => Some(level.into()),
            (None, true) => Some(LevelFilter::DEBUG),
            (None, false) => None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Watch Inbox/ and stage every new file into Needs_Action/
    Watch,

    /// Watch Needs_Action/, Approved/ and Rejected/ and run capabilities
    Orchestrate,

    /// Run the inbox watcher and the orchestrator in one process
    Run,

    /// Generate a briefing from the goals document once and exit
    Briefing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_and_vault() {
        let cli = Cli::try_parse_from(["steward", "--vault", "/tmp/v", "orchestrate"]).unwrap();
        assert_eq!(cli.command, Commands::Orchestrate);
        assert_eq!(cli.vault, PathBuf::from("/tmp/v"));
        assert_eq!(cli.level_override(), None);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["steward", "watch", "-v"]).unwrap();
        assert_eq!(cli.command, Commands::Watch);
        assert_eq!(cli.level_override(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn log_level_beats_verbose() {
        let cli =
            Cli::try_parse_from(["steward", "run", "--verbose", "--log-level", "warn"]).unwrap();
        assert_eq!(cli.level_override(), Some(LevelFilter::WARN));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["steward"]).is_err());
        assert!(Cli::try_parse_from(["steward", "triage"]).is_err());
    }
}
