//! Generation orchestrator
//!
//! Drives the bounded retry loop for each item and commits quota decrements
//! only after a selection has passed score validation. Every item runs to
//! completion before the next one starts, so each draw observes the commits
//! of all earlier items.
//!
//! Per item the generator walks an explicit state machine:
//!
//! ```text
//! Selecting -> Validating -> Committed
//!     ^            |
//!     |            v
//!     +-------- Retry ------> Failed (retry budget spent)
//! ```

use alloc::vec::Vec;
use core::ops::ControlFlow;

use crate::config::Configuration;
use crate::error::{AttemptError, ExhaustionError, ValidationError};
use crate::quota::QuotaState;
use crate::report::RunReport;
use crate::rng::DrawRng;
use crate::score::{in_range, score};
use crate::tier::select_tier;
use crate::types::{GenerationFailure, GenerationResult, ItemOutcome, Progress, Selection};
use crate::variant::{select_variants, Pick};

/// Attempts allowed per item before it is reported as failed
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

enum ItemState {
    Selecting,
    Validating { tier: usize, picks: Vec<Pick> },
    Retry(AttemptError),
    Committed { tier: usize, picks: Vec<Pick>, score: i32 },
    Failed(AttemptError),
}

/// Sequential generator owning the quota state of one run
pub struct Generator<'c, R> {
    config: &'c Configuration,
    quotas: QuotaState,
    rng: R,
    max_attempts: u32,
    progress: Progress,
}

impl<'c, R: DrawRng> Generator<'c, R> {
    pub fn new(config: &'c Configuration, rng: R) -> Self {
        let quotas = QuotaState::initialize(config);
        let progress = Progress {
            remaining_population: quotas.remaining_population(),
            ..Progress::default()
        };
        Self {
            config,
            quotas,
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            progress,
        }
    }

    /// Set the per-item retry ceiling (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn config(&self) -> &'c Configuration {
        self.config
    }

    pub fn quotas(&self) -> &QuotaState {
        &self.quotas
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Generate the next item.
    ///
    /// Never mutates quotas unless the item commits. A failed item is
    /// returned as [`ItemOutcome::Failed`] so batch runs can continue.
    pub fn generate_one(&mut self) -> ItemOutcome {
        let index = self.progress.items;
        let mut attempts = 0u32;
        let mut state = ItemState::Selecting;

        loop {
            state = match state {
                ItemState::Selecting => {
                    attempts += 1;
                    self.progress.attempts += 1;
                    match self.select() {
                        Ok((tier, picks)) => ItemState::Validating { tier, picks },
                        Err(err) => {
                            self.progress.exhaustions += 1;
                            ItemState::Retry(err.into())
                        }
                    }
                }
                ItemState::Validating { tier, picks } => {
                    let total = score(self.config, &picks);
                    if in_range(self.config, tier, total) {
                        match self.quotas.commit(tier, &picks) {
                            Ok(()) => ItemState::Committed {
                                tier,
                                picks,
                                score: total,
                            },
                            Err(err) => {
                                log::error!("item {}: commit rejected: {}", index, err);
                                ItemState::Failed(err.into())
                            }
                        }
                    } else {
                        self.progress.range_mismatches += 1;
                        let spec = &self.config.tiers()[tier];
                        ItemState::Retry(AttemptError::RangeMismatch {
                            tier: spec.id.clone(),
                            score: total,
                            min: spec.score_range.min,
                            max: spec.score_range.max,
                        })
                    }
                }
                ItemState::Retry(err) => {
                    log::debug!("item {} attempt {}: {}", index, attempts, err);
                    if attempts >= self.max_attempts {
                        ItemState::Failed(err)
                    } else {
                        ItemState::Selecting
                    }
                }
                ItemState::Committed { tier, picks, score } => {
                    self.progress.items += 1;
                    self.progress.committed += 1;
                    self.progress.remaining_population = self.quotas.remaining_population();
                    let result = self.build_result(index, tier, &picks, score, attempts);
                    log::debug!(
                        "item {} committed to {} with score {} after {} attempt(s)",
                        index,
                        result.tier,
                        score,
                        attempts
                    );
                    return ItemOutcome::Committed(result);
                }
                ItemState::Failed(err) => {
                    self.progress.items += 1;
                    self.progress.failed += 1;
                    log::warn!(
                        "item {} failed after {} attempt(s): {} ({} left to allocate)",
                        index,
                        attempts,
                        err,
                        self.progress.remaining_population
                    );
                    return ItemOutcome::Failed(GenerationFailure {
                        index,
                        attempts,
                        last_error: err,
                    });
                }
            };
        }
    }

    /// Generate up to `count` items.
    ///
    /// `observe` sees every outcome together with the running totals;
    /// returning [`ControlFlow::Break`] stops the run before the next item.
    pub fn run<F>(&mut self, count: u32, mut observe: F) -> RunReport
    where
        F: FnMut(&ItemOutcome, &Progress) -> ControlFlow<()>,
    {
        let mut results = Vec::new();
        let mut failures = Vec::new();
        let mut stopped = false;

        for n in 0..count {
            let outcome = self.generate_one();
            let flow = observe(&outcome, &self.progress);
            match outcome {
                ItemOutcome::Committed(result) => results.push(result),
                ItemOutcome::Failed(failure) => failures.push(failure),
            }
            if flow.is_break() {
                stopped = n + 1 < count;
                break;
            }
        }

        let progress = self.progress;
        if stopped {
            log::info!("run stopped after {} item(s)", progress.items);
        }
        log::info!(
            "run: {} committed, {} failed, {} attempts ({} range mismatches, {} exhaustions), {} left",
            progress.committed,
            progress.failed,
            progress.attempts,
            progress.range_mismatches,
            progress.exhaustions,
            progress.remaining_population
        );

        RunReport::new(self.config, &self.quotas, progress, results, failures, stopped)
    }

    /// Generate the items still owed to reach the configured population size
    pub fn run_to_completion(&mut self) -> RunReport {
        let count = self
            .config
            .population_size()
            .saturating_sub(self.progress.items);
        self.run(count, |_, _| ControlFlow::Continue(()))
    }

    /// Succeeds only when every tier and variant counter is at zero
    pub fn validate_completion(&self) -> Result<(), ValidationError> {
        let leftovers = self.quotas.leftovers();
        if leftovers.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Incomplete { leftovers })
        }
    }

    fn select(&mut self) -> Result<(usize, Vec<Pick>), ExhaustionError> {
        let tier = select_tier(&self.quotas, &mut self.rng)?;
        let picks = select_variants(self.config, &self.quotas, tier, &mut self.rng)?;
        Ok((tier, picks))
    }

    fn build_result(
        &self,
        index: u32,
        tier: usize,
        picks: &[Pick],
        score: i32,
        attempts: u32,
    ) -> GenerationResult {
        let spec = &self.config.tiers()[tier];
        let selections = picks
            .iter()
            .map(|pick| {
                let category = &self.config.categories()[pick.category];
                let variant = &category.variants[pick.variant];
                Selection {
                    category: category.id.clone(),
                    variant: variant.id.clone(),
                    points: variant.points,
                }
            })
            .collect();

        GenerationResult {
            index,
            tier: spec.id.clone(),
            tier_name: spec.name.clone(),
            score,
            selections,
            attempts,
        }
    }
}
