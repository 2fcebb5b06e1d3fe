//! Capacity-weighted variant selection
//!
//! Each category is drawn independently among the variants tagged for the
//! chosen tier, weighted by remaining quota. Nothing couples the categories,
//! which is why the resulting score has to be checked afterwards.

use alloc::vec::Vec;

use crate::config::Configuration;
use crate::error::ExhaustionError;
use crate::quota::QuotaState;
use crate::rng::DrawRng;

/// One chosen variant, by configuration indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pick {
    pub category: usize,
    pub variant: usize,
}

/// Pick one variant per category, in configured category order
pub fn select_variants<R: DrawRng + ?Sized>(
    config: &Configuration,
    quotas: &QuotaState,
    tier: usize,
    rng: &mut R,
) -> Result<Vec<Pick>, ExhaustionError> {
    let mut picks = Vec::with_capacity(config.categories().len());

    for (category_index, category) in config.categories().iter().enumerate() {
        let candidates: Vec<(usize, u64)> = category
            .tagged(tier)
            .iter()
            .filter_map(|&variant| {
                let remaining = quotas.variant_remaining_at(category_index, variant) as u64;
                (remaining > 0).then_some((variant, remaining))
            })
            .collect();

        let variant = rng
            .pick_weighted(&candidates)
            .ok_or_else(|| ExhaustionError::NoVariant {
                tier: config
                    .tiers()
                    .get(tier)
                    .map(|t| t.id.clone())
                    .unwrap_or_default(),
                category: category.id.clone(),
            })?;

        picks.push(Pick {
            category: category_index,
            variant,
        });
    }

    Ok(picks)
}
