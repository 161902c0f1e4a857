use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod feed;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    commands::run_command(cli)
}
