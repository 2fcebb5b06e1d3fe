//! raritygen-sim
//!
//! Operator CLI for the allocation engine:
//! - loads a configuration document, or the embedded reference layout
//! - allocates the population sequentially, or as parallel shards
//! - prints per-tier counts and validates that every quota was consumed
//! - `--sweep` runs several seeds in parallel to diagnose configurations that
//!   are statistically infeasible
//!
//! Exit status is nonzero on configuration errors and on failed completion
//! validation.

mod output;
mod runner;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use raritygen_core::{Configuration, Loaded, DEFAULT_MAX_ATTEMPTS};

use runner::RunOptions;

#[derive(Parser, Debug, Clone)]
#[command(name = "raritygen-sim", version, about = "Allocate a quota-exact population")]
struct Args {
    /// Configuration document (JSON). Uses the reference layout when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed of the first generator; shards and sweep runs count up from it.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Attempts per item before it is reported as failed.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Items to generate in a sequential run. Defaults to the population size;
    /// a partial run is reported but not validated.
    #[arg(long, conflicts_with_all = ["shards", "sweep"])]
    items: Option<u32>,

    /// Split the configuration and run the shards in parallel.
    #[arg(long, conflicts_with = "sweep")]
    shards: Option<u32>,

    /// Run this many full populations with consecutive seeds in parallel.
    #[arg(long)]
    sweep: Option<u32>,

    /// Stop every generator once this many seconds have passed.
    #[arg(long)]
    time_budget_secs: Option<u64>,

    /// Write the report (or sweep outcomes) as JSON.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Only log warnings and skip the summary table.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

impl Args {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            seed: self.seed,
            max_attempts: self.max_attempts,
            items: self.items,
            time_budget: self.time_budget_secs.map(Duration::from_secs),
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load_configuration(args: &Args) -> Result<Configuration> {
    let Loaded {
        configuration,
        warnings,
    } = match &args.config {
        Some(path) => Configuration::from_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => raritygen_assets::reference_configuration()
            .context("reference configuration is invalid")?,
    };

    if !warnings.is_empty() {
        log::warn!(
            "configuration loaded with {} warning(s); completion may be impossible",
            warnings.len()
        );
    }
    log::info!(
        "population {} over {} tiers and {} categories",
        configuration.population_size(),
        configuration.tiers().len(),
        configuration.categories().len()
    );
    Ok(configuration)
}

fn run_sweep(args: &Args, config: &Configuration, runs: u32) -> Result<()> {
    let outcomes = runner::sweep(config, runs, &args.run_options());

    if !args.quiet {
        output::print_sweep(&mut io::stdout().lock(), &outcomes)?;
    }
    if let Some(path) = &args.output {
        output::write_json(path, &outcomes)?;
    }

    let incomplete = outcomes.iter().filter(|o| !o.complete).count();
    if incomplete > 0 {
        bail!("{incomplete} of {runs} seed(s) left capacity unallocated");
    }
    Ok(())
}

fn run_population(args: &Args, config: &Configuration) -> Result<()> {
    let options = args.run_options();
    let report = match args.shards {
        Some(shards) => runner::sharded(config, shards, &options)?,
        None => runner::sequential(config, &options),
    };

    if !args.quiet {
        output::print_summary(&mut io::stdout().lock(), &report)?;
    }
    if let Some(path) = &args.output {
        let shards = args.shards.unwrap_or(1);
        output::write_json(path, &output::RunOutput::new(options.seed, shards, &report))?;
    }

    if args.items.is_some() {
        log::info!(
            "partial run, {} item(s) left to allocate",
            report.progress.remaining_population
        );
        return Ok(());
    }
    report
        .validate()
        .context("population failed completion validation")?;
    log::info!("population complete");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet);

    let config = load_configuration(&args)?;
    match args.sweep {
        Some(runs) => run_sweep(&args, &config, runs),
        None => run_population(&args, &config),
    }
}
