use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gol_engine::{
    Grid, Simulation, SimulationConfig,
    config::{DEFAULT_FIELD_SIZE, DEFAULT_GENERATION_INTERVAL_MS, DEFAULT_NR_OF_FIELDS},
    domain::pattern,
};
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};

/// Headless Game of Life runner
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Fields per side
    #[arg(short = 'n', long, default_value_t = DEFAULT_NR_OF_FIELDS)]
    fields: usize,

    /// Field size in pixels
    #[arg(short = 's', long, default_value_t = DEFAULT_FIELD_SIZE)]
    size: usize,

    /// Delay between generations in milliseconds
    #[arg(short = 'i', long, default_value_t = DEFAULT_GENERATION_INTERVAL_MS)]
    interval: u64,

    /// Seed for the initial random grid
    #[arg(long)]
    seed: Option<u64>,

    /// Pattern file to load instead of a random grid
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Number of single steps to compute
    #[arg(short, long, default_value_t = 10)]
    generations: u64,

    /// Run the background loop for this many milliseconds instead of stepping
    #[arg(long)]
    run_ms: Option<u64>,

    /// Write the final grid to this pattern file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Only print the status line
    #[arg(short, long)]
    quiet: bool,
}

fn render(grid: &Grid) -> String {
    grid.to_rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| if cell.is_alive() { '#' } else { '.' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SimulationConfig {
        nr_of_fields: args.fields,
        field_size: args.size,
        interval_ms: args.interval,
    }
    .clamped();
    info!("Using {:?}", config);

    let mut sim = Simulation::new(config);
    if let Some(seed) = args.seed {
        sim.reset_with(&mut StdRng::seed_from_u64(seed));
    }

    if let Some(path) = &args.load {
        info!("Reading from file {}", path.display());
        let pattern = pattern::read_file(path)
            .with_context(|| format!("the file {} could not be imported", path.display()))?;
        sim.load_pattern(&pattern)
            .with_context(|| format!("the file {} could not be imported", path.display()))?;
    }

    match args.run_ms {
        Some(ms) => {
            sim.start()?;
            thread::sleep(Duration::from_millis(ms));
            sim.pause();
        }
        None => {
            for _ in 0..args.generations {
                if !sim.step() {
                    warn!("Step skipped at generation {}", sim.generation());
                }
            }
        }
    }

    if !args.quiet {
        println!("{}", sim.read_grid(render));
    }
    println!("{}", sim.status());

    if let Some(path) = &args.export {
        let written = pattern::write_file(path, &sim.export_pattern())
            .with_context(|| format!("the file {} could not be exported", path.display()))?;
        info!("Exported to {}", written.display());
    }

    Ok(())
}
