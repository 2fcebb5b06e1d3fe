//! Aggregate output of a run

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::{Leftover, ValidationError};
use crate::quota::QuotaState;
use crate::types::{GenerationFailure, GenerationResult, Progress};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierTally {
    pub tier: String,
    pub name: String,
    pub quota: u32,
    pub committed: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantTally {
    pub category: String,
    pub variant: String,
    pub tier: String,
    pub quota: u32,
    pub committed: u32,
    pub remaining: u32,
}

/// Per-tier and per-variant counts plus the items produced by a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Totals over the generator's whole life, not only this call
    pub progress: Progress,
    /// The observer asked to stop before every requested item was attempted
    pub stopped: bool,
    pub tiers: Vec<TierTally>,
    pub variants: Vec<VariantTally>,
    pub results: Vec<GenerationResult>,
    pub failures: Vec<GenerationFailure>,
}

impl RunReport {
    pub(crate) fn new(
        config: &Configuration,
        quotas: &QuotaState,
        progress: Progress,
        results: Vec<GenerationResult>,
        failures: Vec<GenerationFailure>,
        stopped: bool,
    ) -> Self {
        let tiers = config
            .tiers()
            .iter()
            .enumerate()
            .map(|(index, tier)| {
                let remaining = quotas.tier_remaining_at(index);
                TierTally {
                    tier: tier.id.clone(),
                    name: tier.name.clone(),
                    quota: tier.quota,
                    committed: tier.quota - remaining,
                    remaining,
                }
            })
            .collect();

        let variants = config
            .categories()
            .iter()
            .enumerate()
            .flat_map(|(category_index, category)| {
                category
                    .variants
                    .iter()
                    .enumerate()
                    .map(move |(variant_index, variant)| {
                        let remaining = quotas.variant_remaining_at(category_index, variant_index);
                        VariantTally {
                            category: category.id.clone(),
                            variant: variant.id.clone(),
                            tier: config.tiers()[variant.tier].id.clone(),
                            quota: variant.quota,
                            committed: variant.quota - remaining,
                            remaining,
                        }
                    })
            })
            .collect();

        Self {
            progress,
            stopped,
            tiers,
            variants,
            results,
            failures,
        }
    }

    pub fn leftovers(&self) -> Vec<Leftover> {
        let tiers = self
            .tiers
            .iter()
            .filter(|t| t.remaining > 0)
            .map(|t| Leftover::Tier {
                tier: t.tier.clone(),
                remaining: t.remaining,
            });
        let variants = self
            .variants
            .iter()
            .filter(|v| v.remaining > 0)
            .map(|v| Leftover::Variant {
                category: v.category.clone(),
                variant: v.variant.clone(),
                remaining: v.remaining,
            });
        tiers.chain(variants).collect()
    }

    /// Completion check over the final tallies
    pub fn validate(&self) -> Result<(), ValidationError> {
        let leftovers = self.leftovers();
        if leftovers.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Incomplete { leftovers })
        }
    }

    pub fn is_complete(&self) -> bool {
        self.tiers.iter().all(|t| t.remaining == 0)
            && self.variants.iter().all(|v| v.remaining == 0)
    }

    /// Merge reports of shards that share one category and tier layout.
    ///
    /// Items are renumbered in shard order. Returns `None` for an empty input
    /// or when the layouts differ.
    pub fn combine(parts: Vec<RunReport>) -> Option<RunReport> {
        let mut parts = parts.into_iter();
        let mut merged = parts.next()?;

        for part in parts {
            if part.tiers.len() != merged.tiers.len() || part.variants.len() != merged.variants.len()
            {
                return None;
            }

            for (into, from) in merged.tiers.iter_mut().zip(&part.tiers) {
                if into.tier != from.tier {
                    return None;
                }
                into.quota += from.quota;
                into.committed += from.committed;
                into.remaining += from.remaining;
            }
            for (into, from) in merged.variants.iter_mut().zip(&part.variants) {
                if into.category != from.category || into.variant != from.variant {
                    return None;
                }
                into.quota += from.quota;
                into.committed += from.committed;
                into.remaining += from.remaining;
            }

            let offset = merged.progress.items;
            merged.results.extend(part.results.into_iter().map(|mut result| {
                result.index += offset;
                result
            }));
            merged.failures.extend(part.failures.into_iter().map(|mut failure| {
                failure.index += offset;
                failure
            }));

            let progress = &mut merged.progress;
            progress.items += part.progress.items;
            progress.committed += part.progress.committed;
            progress.failed += part.progress.failed;
            progress.attempts += part.progress.attempts;
            progress.range_mismatches += part.progress.range_mismatches;
            progress.exhaustions += part.progress.exhaustions;
            progress.remaining_population += part.progress.remaining_population;
            merged.stopped |= part.stopped;
        }

        Some(merged)
    }
}
