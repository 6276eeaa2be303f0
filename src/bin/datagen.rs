//! Offline telemetry tools: synthesize the user/event tables and bulk-load
//! them into the relational store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use engagement_predictor::config_loader::load_config;
use engagement_predictor::loader::load_all;
use engagement_predictor::log_sink::init_logging;
use engagement_predictor::synth::generate_to;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Synthetic telemetry generation and loading")]
struct Args {
    /// Configuration file (defaults to engage.toml, or $ENGAGE_CONFIG)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write users.csv and events.csv into the data directory
    Generate {
        #[clap(long)]
        users: Option<usize>,
        #[clap(long)]
        days: Option<u32>,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(long)]
        data_dir: Option<PathBuf>,
    },

    /// Replace the users and events tables from the CSV files
    Load {
        #[clap(long)]
        data_dir: Option<PathBuf>,
        #[clap(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref()).context("Failed to load config")?;
    init_logging(&config.logging);

    match args.command {
        Command::Generate {
            users,
            days,
            seed,
            data_dir,
        } => {
            if let Some(users) = users {
                config.synth.users = users;
            }
            if let Some(days) = days {
                config.synth.days = days;
            }
            if let Some(seed) = seed {
                config.synth.seed = seed;
            }
            if let Some(dir) = data_dir {
                config.data.data_dir = dir;
            }

            let summary = generate_to(
                &config.synth,
                &config.data.users_path(),
                &config.data.events_path(),
            )?;
            println!(
                "Generated {} users and {} events in {}",
                summary.users,
                summary.events,
                config.data.data_dir.display()
            );
        }
        Command::Load { data_dir, database } => {
            if let Some(dir) = data_dir {
                config.data.data_dir = dir;
            }
            if let Some(db) = database {
                config.data.database_path = db;
            }

            let summary = load_all(
                &config.data.database_path,
                &config.data.users_path(),
                &config.data.events_path(),
            )?;
            println!(
                "Loaded {} users and {} events into {}",
                summary.users,
                summary.events,
                config.data.database_path.display()
            );
        }
    }

    Ok(())
}
