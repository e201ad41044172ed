use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use steward_cli::{
    cli::{Cli, Commands},
    commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Command-line level overrides RUST_LOG
    let env_filter = match cli.level_override() {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Watch => commands::watch::execute(&cli.vault).await,
        Commands::Orchestrate => commands::orchestrate::execute(&cli.vault).await,
        Commands::Run => commands::run::execute(&cli.vault).await,
        Commands::Briefing => commands::briefing::execute(&cli.vault).await,
    }
}
