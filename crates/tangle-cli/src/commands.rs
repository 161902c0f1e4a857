use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use tangle_ring::{OrderKey, RingConfig, RingStatsSnapshot, RingTangle};
use tangle_store::TransactionStore;
use tangle_types::TxHash;

use crate::cli::*;
use crate::feed::{read_feed, FeedOp};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Replay(args) => cmd_replay(args, cli.format),
        Command::Config(args) => cmd_config(args),
    }
}

fn resolve_config(args: &RingArgs) -> anyhow::Result<RingConfig> {
    let mut config = match &args.config {
        Some(path) => RingConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RingConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    config.validate()?;
    Ok(config)
}

/// Outcome of replaying a feed.
#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub capacity: u64,
    pub operations: usize,
    pub resident: usize,
    pub stats: RingStatsSnapshot,
    pub oldest: Option<OrderKey>,
    /// Evicted hashes, in eviction order.
    pub evicted: Vec<TxHash>,
    /// Tracked residents, oldest first. The NULL transaction is not listed.
    pub residents: Vec<OrderKey>,
}

/// Run every operation through a fresh bounded tangle.
pub fn replay(ops: Vec<FeedOp>, config: RingConfig) -> anyhow::Result<ReplaySummary> {
    let ring = RingTangle::with_config(config)?;
    let operations = ops.len();
    let mut evicted = Vec::new();

    for op in ops {
        match op {
            FeedOp::Admit(tx) => {
                let hash = tx.hash();
                let (_, outcome) = ring.admit_with_outcome(tx);
                evicted.extend(outcome.evicted_hash(hash));
            }
            FeedOp::Delete(hash) => {
                ring.delete(&hash);
            }
        }
    }

    info!(operations, resident = ring.size(), "replay finished");
    Ok(ReplaySummary {
        capacity: ring.capacity(),
        operations,
        resident: ring.size(),
        stats: ring.stats(),
        oldest: ring.oldest(),
        evicted,
        residents: ring.tracked_keys(),
    })
}

fn cmd_replay(args: ReplayArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = resolve_config(&args.ring)?;
    let ops = read_feed(&args.input)?;
    let summary = replay(ops, config)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Replayed {} operations (capacity {})",
                "✓".green().bold(),
                summary.operations.to_string().bold(),
                summary.capacity
            );
            println!("  admitted:   {}", summary.stats.admitted);
            println!("  duplicates: {}", summary.stats.duplicates);
            println!("  evicted:    {}", summary.stats.evicted.to_string().yellow());
            println!("  deleted:    {}", summary.stats.deleted);
            println!("  resident:   {}", summary.resident.to_string().cyan());
            if let Some(oldest) = summary.oldest {
                println!(
                    "  oldest:     {} (ts {})",
                    oldest.hash.short_hex().yellow(),
                    oldest.issuance_timestamp
                );
            }
            if args.residents {
                for key in &summary.residents {
                    println!("    {} ts={}", key.hash.to_hex(), key.issuance_timestamp);
                }
            }
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.ring)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
