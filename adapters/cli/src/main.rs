#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless artillery matches.

mod session;
mod settings;
mod terrain_transfer;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use artillery_core::GameSnapshot;
use artillery_world::Terrain;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::{MatchFile, Overrides};

/// Headless artillery duel engine.
#[derive(Parser, Debug)]
#[command(name = "artillery")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a match between scripted opponents and print the standings
    Play {
        /// TOML match file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the match and the terrain
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Difficulty of each scripted player, in turn order
        #[arg(short, long = "difficulty")]
        difficulties: Vec<String>,

        /// Simulated milliseconds per tick
        #[arg(long, default_value = "16")]
        tick_ms: u64,

        /// Ticks to simulate before giving up
        #[arg(long, default_value = "5000000")]
        max_ticks: usize,

        /// Print the final snapshot as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also print the final terrain as a transfer string
        #[arg(long)]
        export_terrain: bool,
    },

    /// Generate a terrain and print its transfer string
    Terrain {
        /// Number of cell columns
        #[arg(long, default_value = "800")]
        width: u32,

        /// Number of cell rows
        #[arg(long, default_value = "600")]
        height: u32,

        /// Generator seed
        #[arg(short, long, default_value = "12345")]
        seed: u64,

        /// Midpoint displacement roughness
        #[arg(long, default_value = "0.7")]
        roughness: f32,
    },

    /// Decode a terrain transfer string and describe it
    Inspect {
        /// String printed by `terrain` or `play --export-terrain`
        encoded: String,
    },
}

fn main() -> Result<()> {
    init_tracing();

    match Args::parse().command {
        Commands::Play {
            config,
            seed,
            rounds,
            difficulties,
            tick_ms,
            max_ticks,
            json,
            export_terrain,
        } => {
            if tick_ms == 0 {
                bail!("--tick-ms must be positive");
            }

            let file = match config {
                Some(path) => MatchFile::load(&path)?,
                None => MatchFile::default(),
            };
            let overrides = Overrides {
                seed,
                rounds,
                difficulties,
            };
            let file = file.resolve(&overrides)?;
            let outcome = session::run(file, Duration::from_millis(tick_ms), max_ticks)?;

            if json {
                let rendered = serde_json::to_string_pretty(&outcome.snapshot)
                    .context("failed to serialise the final snapshot")?;
                println!("{rendered}");
            } else {
                print_standings(&outcome.snapshot);
                println!(
                    "{} shots over {} ticks{}",
                    outcome.shots,
                    outcome.ticks,
                    if outcome.completed { "" } else { " (unfinished)" }
                );
            }
            if export_terrain {
                println!("{}", outcome.terrain);
            }
        }
        Commands::Terrain {
            width,
            height,
            seed,
            roughness,
        } => {
            if width == 0 || height == 0 {
                bail!("terrain dimensions must be positive, got {width}x{height}");
            }
            let terrain = Terrain::generate(width, height, seed, roughness);
            println!("{}", terrain_transfer::encode(terrain.view()));
        }
        Commands::Inspect { encoded } => {
            let terrain =
                terrain_transfer::decode(&encoded).context("failed to decode terrain string")?;
            describe(&terrain);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn print_standings(snapshot: &GameSnapshot) {
    println!(
        "{:<4} {:<16} {:>8} {:>8} {:>6} {:>6}",
        "id", "name", "score", "money", "kills", "deaths"
    );
    for player in &snapshot.players {
        println!(
            "{:<4} {:<16} {:>8} {:>8} {:>6} {:>6}",
            player.config.id.to_string(),
            player.config.name,
            player.score,
            player.money,
            player.kills,
            player.deaths
        );
    }

    match snapshot.winner.and_then(|id| snapshot.player(id)) {
        Some(winner) => println!("winner: {} ({})", winner.config.name, winner.config.id),
        None => println!("winner: none"),
    }
}

fn describe(terrain: &Terrain) {
    let view = terrain.view();
    let surfaces: Vec<i32> = (0..view.width() as i32).map(|x| view.height_at(x)).collect();
    let highest = surfaces.iter().min().copied().unwrap_or(0);
    let lowest = surfaces.iter().max().copied().unwrap_or(0);

    println!("{}x{}", view.width(), view.height());
    println!("solid cells: {}", view.solid_count());
    println!("surface rows: {highest}..={lowest}");
}
