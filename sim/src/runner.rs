//! Run strategies: one sequential generator, parallel shards, or a seed sweep

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use raritygen_core::{
    shard, Configuration, Generator, ItemOutcome, Leftover, Progress, RunReport, XorShiftRng,
};

/// Items between two progress lines
const PROGRESS_EVERY: u32 = 1_000;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub seed: u64,
    pub max_attempts: u32,
    /// Items to attempt in a sequential run, the population size when unset
    pub items: Option<u32>,
    pub time_budget: Option<Duration>,
}

/// Wall-clock budget shared by every generator of one invocation
struct Budget {
    started: Instant,
    limit: Option<Duration>,
}

impl Budget {
    fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn exceeded(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.started.elapsed() >= limit)
    }
}

fn observer<'a>(
    label: &'a str,
    budget: &'a Budget,
) -> impl FnMut(&ItemOutcome, &Progress) -> ControlFlow<()> + 'a {
    move |_, progress| {
        if progress.items % PROGRESS_EVERY == 0 {
            log::info!(
                "{}: {} items ({} committed, {} failed), {} attempts, {} left",
                label,
                progress.items,
                progress.committed,
                progress.failed,
                progress.attempts,
                progress.remaining_population
            );
        }
        if budget.exceeded() {
            log::warn!(
                "{}: time budget spent after {} items",
                label,
                progress.items
            );
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

fn generator<'c>(config: &'c Configuration, seed: u64, max_attempts: u32) -> Generator<'c, XorShiftRng> {
    Generator::new(config, XorShiftRng::seed_from_u64(seed)).with_max_attempts(max_attempts)
}

/// One generator over the whole configuration
pub fn sequential(config: &Configuration, options: &RunOptions) -> RunReport {
    let budget = Budget::start(options.time_budget);
    let count = options.items.unwrap_or(config.population_size());
    generator(config, options.seed, options.max_attempts).run(count, observer("run", &budget))
}

/// Split into `shards` disjoint configurations and run them in parallel.
///
/// Shard `i` is seeded with `seed + i`.
pub fn sharded(config: &Configuration, shards: u32, options: &RunOptions) -> Result<RunReport> {
    let parts = shard::split(config, shards)?;
    let budget = Budget::start(options.time_budget);

    let reports: Vec<RunReport> = parts
        .par_iter()
        .enumerate()
        .map(|(index, part)| {
            let label = format!("shard {index}");
            let seed = options.seed.wrapping_add(index as u64);
            generator(part, seed, options.max_attempts)
                .run(part.population_size(), observer(&label, &budget))
        })
        .collect();

    RunReport::combine(reports).context("shards do not share one layout")
}

/// Outcome of one full run in a seed sweep
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOutcome {
    pub seed: u64,
    pub complete: bool,
    pub committed: u32,
    pub failed: u32,
    pub attempts: u64,
    pub leftovers: Vec<Leftover>,
}

/// Independent full runs with consecutive seeds, in parallel
pub fn sweep(config: &Configuration, runs: u32, options: &RunOptions) -> Vec<SweepOutcome> {
    let budget = Budget::start(options.time_budget);

    (0..runs)
        .into_par_iter()
        .map(|offset| {
            let seed = options.seed.wrapping_add(offset as u64);
            let label = format!("seed {seed}");
            let report = generator(config, seed, options.max_attempts)
                .run(config.population_size(), observer(&label, &budget));
            SweepOutcome {
                seed,
                complete: report.is_complete(),
                committed: report.progress.committed,
                failed: report.progress.failed,
                attempts: report.progress.attempts,
                leftovers: report.leftovers(),
            }
        })
        .collect()
}
