//! Command-line driver for the hatchery simulation.

mod profile;
mod sink;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use hatchery_core::SimConfig;
use hatchery_world::Simulation;
use sink::OutputSink;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "hatchery")]
#[command(about = "Toroidal mover and egg evolution simulator")]
struct Args {
    /// Path to a JSON configuration file; defaults apply for missing keys
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (overrides the config)
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving snapshots and frames
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,

    /// Write a TSV snapshot at every output tick
    #[arg(long)]
    snapshots: bool,

    /// Write a JSON draw list at every output tick
    #[arg(long)]
    frames: bool,

    /// Write per-phase timings as JSON to this file
    #[arg(long)]
    cpuprofile: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() {
    let args = Args::parse();
    telemetry::init_tracing(args.log_json);

    if let Err(e) = run(args) {
        error!(error = %e, "Simulation aborted: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    info!(
        ticks = config.run.ticks,
        seed = config.seed,
        output_dir = %args.output_dir.display(),
        snapshots = args.snapshots,
        frames = args.frames,
        "Starting hatchery"
    );

    let mut sim = Simulation::new(config).context("Failed to create simulation")?;
    let mut sink = OutputSink::new(
        args.output_dir.clone(),
        args.snapshots,
        args.frames,
        args.cpuprofile.is_some(),
    )
    .context("Failed to prepare output directory")?;

    let outcome = sim.run(&mut sink);

    // The profile is kept even when the run died part way through.
    if let (Some(path), Some(profile)) = (&args.cpuprofile, sink.profile()) {
        profile.write_to(path)?;
    }

    if let Err(e) = &outcome {
        if e.is_ambiguous_collision() {
            error!(
                event = "ambiguous_collision",
                movers = sim.movers().len(),
                "Two movers closed at exactly the same speed"
            );
        }
    }
    let totals = outcome.with_context(|| format!("Run failed at tick {}", sim.tick()))?;
    info!(
        ticks = totals.ticks,
        files_written = sink.written(),
        output_dir = %sink.output_dir().display(),
        final_movers = sim.movers().len(),
        final_eggs = sim.eggs().len(),
        "Run finished"
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SimConfig::from_json_str(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
