use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tangle",
    about = "Bounded tangle: replay transaction feeds under a capacity limit",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a JSON-lines feed through a bounded tangle
    Replay(ReplayArgs),
    /// Print the effective ring configuration
    Config(ConfigArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct RingArgs {
    /// TOML file with ring settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Maximum resident transactions, NULL transaction included
    #[arg(short, long)]
    pub capacity: Option<u64>,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub ring: RingArgs,
    /// Feed file: one JSON transaction or deletion per line
    pub input: PathBuf,
    /// List every resident transaction after the replay
    #[arg(long)]
    pub residents: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub ring: RingArgs,
}
