//! Sharded sub-quota configurations
//!
//! A single [`QuotaState`](crate::quota::QuotaState) must never be shared
//! between concurrent generators. Parallel batches instead split the whole
//! configuration into disjoint shards whose quotas add up to the original
//! ones, and run one sequential generator per shard.

use alloc::vec;
use alloc::vec::Vec;

use crate::config::{Configuration, FeasibilityPolicy};
use crate::error::ShardError;
use crate::feasibility;

/// Split `total` into `parts` near-equal amounts, rotating the remainder by `offset`
fn even_split(total: u32, parts: u32, offset: usize) -> Vec<u32> {
    let base = total / parts;
    let extra = (total % parts) as usize;
    let parts = parts as usize;
    (0..parts)
        .map(|shard| base + u32::from((shard + parts - offset % parts) % parts < extra))
        .collect()
}

/// Split a configuration into `shards` disjoint configurations.
///
/// Tier quotas are divided evenly. Within each category, the variants tagged
/// for a tier are divided so that each shard receives exactly as much tagged
/// quota as its share of that tier, whenever the source configuration is
/// itself consistent. Every tier and variant quota is conserved across the
/// shards.
///
/// Units that do not divide evenly are dealt in point order, ascending in
/// even categories and descending in odd ones, so a shard that receives a
/// low-point variant in one category tends to receive a high-point one in
/// the next. When the source passes [`feasibility::analyze`], every shard is
/// checked too and a shard that fails it is reported as
/// [`ShardError::Infeasible`].
pub fn split(config: &Configuration, shards: u32) -> Result<Vec<Configuration>, ShardError> {
    if shards == 0 {
        return Err(ShardError::ZeroShards);
    }
    if shards > config.population_size() {
        return Err(ShardError::TooManyShards {
            shards,
            population: config.population_size(),
        });
    }
    let shard_count = shards as usize;

    // tier_shares[tier][shard]
    let tier_shares: Vec<Vec<u32>> = config
        .tiers()
        .iter()
        .enumerate()
        .map(|(index, tier)| even_split(tier.quota, shards, index))
        .collect();

    // variant_shares[category][variant][shard]
    let mut variant_shares: Vec<Vec<Vec<u32>>> = config
        .categories()
        .iter()
        .map(|category| vec![vec![0; shard_count]; category.variants.len()])
        .collect();

    for (category_index, category) in config.categories().iter().enumerate() {
        let shares = &mut variant_shares[category_index];
        for (tier_index, demand) in tier_shares.iter().enumerate() {
            let tagged = category.tagged(tier_index);
            let mut deficit: Vec<i64> = demand.iter().map(|&d| d as i64).collect();

            for &variant in tagged {
                let quota = category.variants[variant].quota;
                let base = quota / shards;
                for (shard, share) in shares[variant].iter_mut().enumerate() {
                    *share = base;
                    deficit[shard] -= base as i64;
                }
            }

            let mut units: Vec<usize> = tagged
                .iter()
                .flat_map(|&variant| {
                    let leftover = category.variants[variant].quota % shards;
                    core::iter::repeat(variant).take(leftover as usize)
                })
                .collect();
            units.sort_by_key(|&variant| category.variants[variant].points);
            if category_index % 2 == 1 {
                units.reverse();
            }

            let mut next = 0;
            for variant in units {
                let shard = (0..shard_count)
                    .map(|step| (next + step) % shard_count)
                    .find(|&shard| deficit[shard] > 0)
                    .unwrap_or(next);
                shares[variant][shard] += 1;
                deficit[shard] -= 1;
                next = (shard + 1) % shard_count;
            }
        }
    }

    let mut configurations = Vec::with_capacity(shard_count);
    for shard in 0..shard_count {
        let mut doc = config.to_document();
        doc.feasibility_check = FeasibilityPolicy::Off;
        doc.population_size = Some(tier_shares.iter().map(|shares| shares[shard]).sum());

        if let Some(tiers) = doc.tiers.as_mut() {
            for (tier_index, entry) in tiers.iter_mut().enumerate() {
                entry.quota = Some(tier_shares[tier_index][shard]);
            }
        }
        if let Some(categories) = doc.categories.as_mut() {
            for (category_index, entry) in categories.iter_mut().enumerate() {
                for (variant_index, variant) in entry.variants.iter_mut().enumerate() {
                    variant.quota = Some(variant_shares[category_index][variant_index][shard]);
                }
            }
        }
        configurations.push(Configuration::from_document(doc)?.configuration);
    }

    if feasibility::analyze(config).is_empty() {
        for (shard, configuration) in configurations.iter().enumerate() {
            let issues = feasibility::analyze(configuration);
            if !issues.is_empty() {
                return Err(ShardError::Infeasible { shard, issues });
            }
        }
    } else {
        log::debug!("source configuration has feasibility issues, shards left unchecked");
    }

    log::debug!("split configuration into {} shard(s)", shard_count);
    Ok(configurations)
}
