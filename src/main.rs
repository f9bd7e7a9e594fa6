//! Nong entry point
//!
//! Runs the learning paddle headlessly for a fixed wall-clock duration and
//! keeps its brain on disk between runs.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use nong::Settings;
use nong::platform::HeadlessSurface;
use nong::runtime::SimulationLoop;

#[derive(Parser, Debug)]
#[command(name = "nong")]
#[command(about = "Pong played by a neural network that keeps learning")]
struct Cli {
    /// JSON settings file (missing fields use defaults)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// How long to run, in seconds
    #[arg(long, default_value_t = 10)]
    seconds: u64,
    /// Directory holding saved brains
    #[arg(long)]
    brain_dir: Option<PathBuf>,
    /// Seed for a fresh brain
    #[arg(long)]
    seed: Option<u64>,
    /// Ignore any saved brain and start from random weights
    #[arg(long, default_value_t = false)]
    fresh: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(dir) = cli.brain_dir {
        settings.brain_dir = dir;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }

    log::info!("Nong starting ({}s run)", cli.seconds);
    let surface = HeadlessSurface::new(settings.field_width, settings.field_height);
    let sim = SimulationLoop::new(&settings, Box::new(surface))
        .context("failed to build the game")?
        .load_saved_brain(!cli.fresh);

    sim.start().context("failed to start the simulation loop")?;
    thread::sleep(Duration::from_secs(cli.seconds));
    sim.stop();

    let stats = sim.stats();
    log::info!(
        "Finished after {} ticks: {} misses, best rally {}, brain saved to {}",
        stats.total_updates,
        stats.misses,
        stats.best_rally,
        sim.store().path_for(&settings.brain_name).display()
    );
    Ok(())
}
