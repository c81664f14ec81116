//! Command-line interface for sorting-yard.
//!
//! Provides commands for simulating a shift and inspecting the resolved
//! configuration.

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::Handler;
use crate::report::{ReportFormat, ShiftReporter};
use crate::simulation::ShiftRunner;
use crate::workload::WorkloadGenerator;

/// sorting-yard - Marshalling yard shift dispatcher
#[derive(Parser, Debug)]
#[command(name = "sorting-yard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate one shift with a random workload
    Run {
        /// Number of classification paths (random if not provided)
        #[arg(short, long)]
        paths: Option<usize>,

        /// Number of incoming wagons (random if not provided)
        #[arg(short, long)]
        wagons: Option<usize>,

        /// RNG seed for a reproducible shift
        #[arg(short, long)]
        seed: Option<u64>,

        /// Delay between dispatched events in milliseconds
        #[arg(long)]
        pace_ms: Option<u64>,

        /// Stop drawing events after this many
        #[arg(long)]
        max_events: Option<u64>,

        /// Print the shift report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                paths,
                wagons,
                seed,
                pace_ms,
                max_events,
                json,
            } => {
                let mut config = config::config()?.clone();
                if seed.is_some() {
                    config.seed = seed;
                }
                if let Some(pace_ms) = pace_ms {
                    config.pace_ms = pace_ms;
                }
                if let Some(max_events) = max_events {
                    config.limits.max_events = max_events;
                }
                let format = if json {
                    ReportFormat::Json
                } else {
                    ReportFormat::Text
                };
                run_shift(config, paths, wagons, format).await
            }
            Commands::Config => show_config(),
        }
    }
}

/// Simulate one shift and print its report
async fn run_shift(
    config: ResolvedConfig,
    paths: Option<usize>,
    wagons: Option<usize>,
    format: ReportFormat,
) -> Result<()> {
    if paths == Some(0) {
        anyhow::bail!("A yard needs at least one path");
    }

    let generator = WorkloadGenerator::new(config.workload.clone(), config.seed)
        .context("Failed to build workload")?;
    let mut runner = ShiftRunner::new(generator, config.limits.clone(), config.pace_ms);

    let mut orchestrator = runner.prepare_shift(paths, wagons);
    orchestrator.register(Handler::observer(ShiftReporter::new(io::stdout(), format)));

    let summary = runner.run(&mut orchestrator).await?;

    if let Some(violation) = summary.limit_reached {
        eprintln!("\n[Shift stopped early: {}]", violation);
    }
    eprintln!(
        "\n[{} events drawn, {} dispatched]",
        summary.events_drawn, summary.events_dispatched
    );

    Ok(())
}

/// Show the resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    let w = &config.workload;
    println!("Paths:       {}..={}", w.min_paths, w.max_paths);
    println!("Wagons:      {}..={}", w.min_wagons, w.max_wagons);
    println!(
        "Weights:     wagon={} loco={} prepare={} plan={} ready={}",
        w.event_weights.wagon,
        w.event_weights.loco,
        w.event_weights.prepare,
        w.event_weights.plan,
        w.event_weights.ready
    );
    println!("Pace:        {} ms", config.pace_ms);
    println!("Max events:  {}", config.limits.max_events);
    match config.seed {
        Some(seed) => println!("Seed:        {}", seed),
        None => println!("Seed:        (entropy)"),
    }

    Ok(())
}
