//! # sim_app — Tick driver
//!
//! Runs a self-contained world simulation on top of `sim_component` and
//! `sim_spatial`: creatures drift, flock with their own faction, and wear
//! each other down when the factions meet.
//!
//! ## Startup Sequence
//!
//! 1. Load the configuration (JSON file, then command-line overrides).
//! 2. Populate a fresh world, or restore one from a snapshot file.
//! 3. Enter the fixed-timestep tick loop.
//! 4. Optionally write the final world to a snapshot file.

mod components;
mod config;
mod registry;
mod systems;
mod tick;
mod world;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::SimConfig;
use tick::TickLoop;
use world::World;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "sim_app", about = "Fixed-timestep world simulation")]
struct Args {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to run (0 = unlimited). Overrides the config file.
    #[arg(long)]
    ticks: Option<u64>,
    /// Creatures to spawn in a fresh world. Overrides the config file.
    #[arg(long)]
    entities: Option<usize>,
    /// Restore the world from this snapshot instead of spawning one.
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Write the final world to this snapshot file.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sim_app=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        config.max_ticks = ticks;
    }
    if let Some(entities) = args.entities {
        config.initial_entities = entities;
    }
    config.validate()?;

    info!(?config, "simulation starting");

    let world = match &args.resume {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            let snapshot = sim_component::snapshot::decode(&bytes)?;
            World::from_snapshot(&config, &snapshot)?
        }
        None => {
            let mut world = World::new(&config)?;
            world.populate(config.initial_entities);
            world
        }
    };

    let mut tick_loop = TickLoop::with_default_systems(&config, world);
    tick_loop.run()?;

    if let Some(path) = &args.snapshot {
        let snapshot = tick_loop.world().snapshot()?;
        let bytes = sim_component::snapshot::encode(&snapshot)?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(
            path = %path.display(),
            entities = snapshot.entities.len(),
            bytes = bytes.len(),
            "snapshot written"
        );
    }

    info!(ticks = tick_loop.tick_id(), "simulation shut down");
    Ok(())
}
