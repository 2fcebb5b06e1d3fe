//! Operator-facing summaries and JSON output

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use raritygen_core::RunReport;

use crate::runner::SweepOutcome;

/// JSON document written by `--output` for a single or sharded run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput<'a> {
    pub seed: u64,
    pub shards: u32,
    pub complete: bool,
    pub report: &'a RunReport,
}

impl<'a> RunOutput<'a> {
    pub fn new(seed: u64, shards: u32, report: &'a RunReport) -> Self {
        Self {
            seed,
            shards,
            complete: report.is_complete(),
            report,
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub fn print_summary(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:<16} {:>8} {:>10} {:>10}",
        "tier", "name", "quota", "committed", "remaining"
    )?;
    for tier in &report.tiers {
        writeln!(
            out,
            "{:<8} {:<16} {:>8} {:>10} {:>10}",
            tier.tier, tier.name, tier.quota, tier.committed, tier.remaining
        )?;
    }

    let progress = &report.progress;
    writeln!(
        out,
        "items: {} committed, {} failed",
        progress.committed, progress.failed
    )?;
    writeln!(
        out,
        "attempts: {} ({} range mismatches, {} exhaustions)",
        progress.attempts, progress.range_mismatches, progress.exhaustions
    )?;

    let open = report.variants.iter().filter(|v| v.remaining > 0).count();
    writeln!(
        out,
        "variants with capacity left: {}/{}",
        open,
        report.variants.len()
    )?;
    if report.stopped {
        writeln!(out, "run stopped early")?;
    }
    Ok(())
}

pub fn print_sweep(out: &mut impl Write, outcomes: &[SweepOutcome]) -> io::Result<()> {
    writeln!(
        out,
        "{:>12} {:>9} {:>10} {:>7} {:>10}",
        "seed", "complete", "committed", "failed", "attempts"
    )?;
    for outcome in outcomes {
        writeln!(
            out,
            "{:>12} {:>9} {:>10} {:>7} {:>10}",
            outcome.seed, outcome.complete, outcome.committed, outcome.failed, outcome.attempts
        )?;
    }

    let complete = outcomes.iter().filter(|o| o.complete).count();
    writeln!(out, "{complete}/{} seed(s) completed", outcomes.len())
}
