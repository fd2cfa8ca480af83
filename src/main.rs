//! Operator command-line entry point for the kit-ledger rating service
//!
//! Connects to the configured Postgres store and exposes the ledger's four
//! operations as subcommands. Front ends embed the library instead.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kit_ledger::config::AppConfig;
use kit_ledger::rating::RatingEngine;
use kit_ledger::store::PostgresStore;
use kit_ledger::types::{kits, PlayerId};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Kit Ledger - Elo rating ledger for kit-scoped head-to-head competition
#[derive(Parser)]
#[command(
    name = "kit-ledger",
    version,
    about = "Rating ledger for kit-scoped head-to-head competition",
    long_about = "Kit Ledger stores one rating record per (player, kit), seeds new \
                 registrations from a configured default or the league average, and \
                 applies Elo-style updates with provisional-player weighting."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Database URL override
    #[arg(long, value_name = "URL", help = "Override Postgres connection URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new player in a kit
    Register {
        /// Player display name
        #[arg(long)]
        name: String,
        /// Kit to compete in
        #[arg(long)]
        kit: String,
    },
    /// Record a match result between two players
    Record {
        /// Winning player's id
        #[arg(long)]
        winner: PlayerId,
        /// Losing player's id
        #[arg(long)]
        loser: PlayerId,
        /// The match was a draw (winner/loser order then carries no meaning)
        #[arg(long)]
        draw: bool,
    },
    /// Print a kit's leaderboard, best rating first
    Leaderboard {
        /// Kit to list
        #[arg(long)]
        kit: String,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a single player's record
    Show {
        /// Player id
        #[arg(long)]
        id: PlayerId,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(level) = &args.log_level {
        config.service.log_level = level.clone();
    }
    if let Some(url) = &args.database_url {
        config.store.database_url = url.clone();
    }

    init_logging(&config.service.log_level)?;
    info!("Starting {} v{}", config.service.name, kit_ledger::VERSION);

    let store = Arc::new(PostgresStore::connect(&config.store).await?);
    let engine = RatingEngine::new(store, config.rating.clone());

    match args.command {
        Command::Register { name, kit } => {
            // The store takes any non-empty kit; flag likely typos against
            // the league's reference vocabulary without rejecting them.
            if !kits::ALL.contains(&kit.as_str()) {
                warn!(
                    "Kit '{}' is not in the reference vocabulary ({})",
                    kit,
                    kits::ALL.join(", ")
                );
            }
            let id = engine.register(&name, &kit).await?;
            println!("{}", id);
        }
        Command::Record {
            winner,
            loser,
            draw,
        } => {
            let report = engine.record_match(winner, loser, draw).await?;
            println!(
                "winner {}: {:.1} -> {:.1} ({:+.1})",
                report.winner_id,
                report.winner_old_rating,
                report.winner_new_rating,
                report.winner_delta()
            );
            println!(
                "loser  {}: {:.1} -> {:.1} ({:+.1})",
                report.loser_id,
                report.loser_old_rating,
                report.loser_new_rating,
                report.loser_delta()
            );
        }
        Command::Leaderboard { kit, json } => {
            let players = engine.leaderboard(&kit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&players)?);
            } else {
                for (rank, player) in players.iter().enumerate() {
                    println!(
                        "{:>3}. {:<30} {:>8.1}  ({} matches)",
                        rank + 1,
                        player.display_name,
                        player.rating,
                        player.matches
                    );
                }
            }
        }
        Command::Show { id } => {
            let player = engine.player(id).await?;
            println!("{}", serde_json::to_string_pretty(&player)?);
        }
    }

    Ok(())
}
