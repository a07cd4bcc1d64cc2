use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use pressure_sim::core::ScheduledCommand;
use pressure_sim::error::Result;
use pressure_sim::{Engine, SimConfig};

/// Headless driver: runs the gas engine for a number of ticks, applying a
/// scripted command list, and logs the thermodynamic readout.
#[derive(Debug, Parser)]
#[command(name = "pressure-sim", version, about)]
struct Cli {
    /// JSON config file (missing fields use defaults).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of `{"at": <tick>, "command": ...}` entries.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Log a readout every N ticks.
    #[arg(long, default_value_t = 60)]
    report_every: u64,

    /// Override the RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the worker pool size.
    #[arg(long)]
    workers: Option<usize>,

    /// Print the final snapshot as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    if let Some(w) = cli.workers {
        cfg.workers = w;
    }

    let mut script: Vec<ScheduledCommand> = match &cli.script {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    script.sort_by_key(|s| s.at);

    let mut engine = Engine::new(cfg)?;
    let mut pending = script.into_iter().peekable();
    let report_every = cli.report_every.max(1);

    for t in 0..cli.ticks {
        while let Some(next) = pending.next_if(|s| s.at <= t) {
            info!("tick {t}: {:?}", next.command);
            engine.apply(next.command);
        }
        let stats = engine.tick();
        if stats.tick % report_every == 0 {
            let g = engine.gas();
            info!(
                "tick {:>5} | V {:6.2} | T {:6.1} K | m {:6.3} kg | P {:10.2} Pa | {} active, {} exiting, {} contacts",
                stats.tick,
                g.volume(),
                g.temperature(),
                g.mass(),
                g.pressure(),
                stats.active,
                stats.exiting,
                stats.contacts
            );
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    }
    Ok(())
}
