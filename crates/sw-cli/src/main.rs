//! CLI frontend for the Swarmworld simulation backend.

mod commands;
mod viewport;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sw",
    about = "Swarmworld: a streaming world simulation",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation and save the world when it stops
    Run {
        /// JSON file with simulation settings; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many ticks (0 = no tick limit)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Stop after this many seconds of wall-clock time
        #[arg(long)]
        duration: Option<f64>,

        /// RNG seed for seeding and room synthesis
        #[arg(short, long)]
        seed: Option<u64>,

        /// Target ticks per second
        #[arg(long)]
        tick_rate: Option<f64>,

        /// Run ticks back to back without pacing
        #[arg(long)]
        unpaced: bool,

        /// Side length of the initial block of regions
        #[arg(long)]
        grid: Option<i32>,

        /// Number of swarmlings seeded at startup
        #[arg(short, long)]
        population: Option<usize>,

        /// Save the world every this many ticks (0 = only on exit)
        #[arg(long)]
        persist_interval: Option<u64>,

        /// Where the world snapshot is written
        #[arg(long, default_value = "world.json")]
        save: PathBuf,

        /// Load the save file first if it exists
        #[arg(long)]
        resume: bool,

        /// Update entities on all cores
        #[arg(long)]
        parallel: bool,

        /// Artificial generator delay per region, in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,

        /// Width and height of the viewport in regions
        #[arg(long, default_value = "3")]
        view: i32,

        /// Pan the viewport one region east every N ticks (0 = never)
        #[arg(long, default_value = "50")]
        pan_every: u64,
    },

    /// Summarize a saved world snapshot
    Inspect {
        /// Snapshot file to read
        #[arg(default_value = "world.json")]
        path: PathBuf,

        /// List every region
        #[arg(short, long)]
        regions: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            ticks,
            duration,
            seed,
            tick_rate,
            unpaced,
            grid,
            population,
            persist_interval,
            save,
            resume,
            parallel,
            latency_ms,
            view,
            pan_every,
        } => commands::run::run(&commands::run::RunOptions {
            config,
            ticks,
            duration,
            seed,
            tick_rate: if unpaced { Some(0.0) } else { tick_rate },
            grid,
            population,
            persist_interval,
            save,
            resume,
            parallel,
            latency_ms,
            view,
            pan_every,
        }),
        Commands::Inspect {
            path,
            regions,
            json,
        } => commands::inspect::run(&path, regions, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
