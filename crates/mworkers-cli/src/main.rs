use anyhow::Result;
use std::io::IsTerminal;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mworkers_cli::{cli::Cli, config, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(cli.log_level().into()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let config = config::resolve(&cli)?;
    debug!(?config, "effective configuration");

    run::run(&config)
}
