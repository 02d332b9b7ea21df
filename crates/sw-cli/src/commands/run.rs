use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tracing::info;

use sw_core::{RegionCoord, RegionRect, WorldSnapshot};
use sw_simulation::{
    ExecutionMode, HaltSignal, JsonFileSink, RunSummary, SimConfig, Swarmling, TickScheduler,
};
use sw_worldgen::{CavernSynth, GeneratorWorker};

use crate::viewport::PanningViewport;

/// Tick limit used when neither the flags nor the config file set one.
const DEFAULT_TICKS: u64 = 1_000;

/// Everything `sw run` was asked to do.
pub struct RunOptions {
    /// JSON settings file applied before the flags.
    pub config: Option<PathBuf>,
    /// Tick limit. 0 removes the limit.
    pub ticks: Option<u64>,
    /// Wall-clock limit in seconds.
    pub duration: Option<f64>,
    /// RNG seed override.
    pub seed: Option<u64>,
    /// Ticks per second override. 0 runs unpaced.
    pub tick_rate: Option<f64>,
    /// Side length of the initial region block.
    pub grid: Option<i32>,
    /// Entities seeded at startup.
    pub population: Option<usize>,
    /// Ticks between periodic saves.
    pub persist_interval: Option<u64>,
    /// Snapshot file written on every persist.
    pub save: PathBuf,
    /// Load `save` before startup if it exists.
    pub resume: bool,
    /// Update entities on the rayon pool.
    pub parallel: bool,
    /// Artificial per-region generator delay.
    pub latency_ms: u64,
    /// Side length of the viewport in regions.
    pub view: i32,
    /// Ticks between viewport pans.
    pub pan_every: u64,
}

/// Run a simulation and print a summary table.
pub fn run(opts: &RunOptions) -> Result<(), String> {
    let config = build_config(opts)?;

    let synth = CavernSynth::new(config.seed);
    let generator =
        GeneratorWorker::new(synth).with_latency(Duration::from_millis(opts.latency_ms));
    let view = RegionRect::with_size(RegionCoord::new(0, 0), opts.view, opts.view);
    let presentation = PanningViewport::new(view, opts.pan_every);
    let sink = JsonFileSink::new(&opts.save);

    let halt = HaltSignal::new();
    if let Some(secs) = opts.duration {
        start_timer(secs, halt.clone())?;
    }

    let mut sched = TickScheduler::new(config, generator, presentation, sink, halt);

    if opts.resume && opts.save.exists() {
        let snapshot = WorldSnapshot::load(&opts.save)
            .map_err(|e| format!("cannot resume from {}: {e}", opts.save.display()))?;
        let restored = sched.restore(snapshot);
        println!(
            "  Restored {restored} regions from {}",
            opts.save.display()
        );
    }

    let seeded = sched
        .startup(Swarmling::seed)
        .map_err(|e| format!("startup failed: {e}"))?;
    info!(seeded, "simulation running");

    let summary = sched.run().map_err(|e| format!("simulation error: {e}"))?;

    print_summary(&sched, &summary, opts);
    Ok(())
}

fn build_config(opts: &RunOptions) -> Result<SimConfig, String> {
    let mut config = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            SimConfig::from_json(&text)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(seed) = opts.seed {
        config = config.with_seed(seed);
    }
    if let Some(rate) = opts.tick_rate {
        config = config.with_tick_rate(rate);
    }
    if let Some(grid) = opts.grid {
        config = config.with_initial_grid(grid);
    }
    if let Some(population) = opts.population {
        config = config.with_initial_population(population);
    }
    if let Some(interval) = opts.persist_interval {
        config = config.with_persist_interval(interval);
    }
    if opts.parallel {
        config = config.with_execution(ExecutionMode::Parallel);
    }
    config.max_ticks = match opts.ticks {
        Some(0) => None,
        Some(ticks) => Some(ticks),
        None if opts.duration.is_some() => config.max_ticks,
        None => config.max_ticks.or(Some(DEFAULT_TICKS)),
    };

    if config.max_ticks.is_none() && opts.duration.is_none() {
        return Err("refusing to run without a tick limit or --duration".into());
    }
    Ok(config)
}

fn start_timer(secs: f64, halt: HaltSignal) -> Result<(), String> {
    let wait = Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("invalid --duration {secs}: {e}"))?;
    thread::Builder::new()
        .name("sw-timer".into())
        .spawn(move || {
            thread::sleep(wait);
            halt.trigger();
        })
        .map_err(|e| format!("cannot start timer: {e}"))?;
    Ok(())
}

fn print_summary(
    sched: &TickScheduler<GeneratorWorker<CavernSynth>, PanningViewport, JsonFileSink>,
    summary: &RunSummary,
    opts: &RunOptions,
) {
    let config = sched.config();
    println!(
        "  {} {}",
        "Simulation".bold(),
        format!(
            "(seed={}, grid={}, execution={:?})",
            config.seed, config.initial_grid, config.execution
        )
        .dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Ticks".to_string(), summary.ticks.to_string()]);
    table.add_row(vec![
        "Population".to_string(),
        summary.population.to_string(),
    ]);
    table.add_row(vec![
        "Resident regions".to_string(),
        summary.resident_regions.to_string(),
    ]);
    table.add_row(vec![
        "Pending regions".to_string(),
        summary.pending_regions.to_string(),
    ]);
    table.add_row(vec![
        "Generation requests".to_string(),
        summary.requests_issued.to_string(),
    ]);
    table.add_row(vec![
        "Snapshots written".to_string(),
        summary.persists.to_string(),
    ]);
    table.add_row(vec![
        "Viewport".to_string(),
        format!(
            "{} ({} of {} visible, peak {})",
            sched.presentation().rect(),
            sched.presentation().last_visible(),
            sched.presentation().rect().len(),
            sched.presentation().most_visible()
        ),
    ]);
    println!("{table}");
    println!();

    if summary.persist_failures > 0 {
        println!(
            "  {} {} periodic saves failed",
            "WARN".yellow().bold(),
            summary.persist_failures
        );
    }
    if !summary.generator_joined {
        println!(
            "  {} generator did not stop within {:?}",
            "WARN".yellow().bold(),
            config.join_timeout
        );
    }
    println!(
        "  {} world to {}",
        "Saved".green().bold(),
        opts.save.display()
    );
}
