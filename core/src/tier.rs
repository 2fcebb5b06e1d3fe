//! Bias-weighted tier selection
//!
//! Weights are `remaining × bias`, where the bias is a static bell curve over
//! tier positions that favors the central tiers. Multipliers are stored in
//! tenths so the draw stays in integer arithmetic.

use alloc::vec::Vec;

use crate::error::ExhaustionError;
use crate::quota::QuotaState;
use crate::rng::DrawRng;

/// Bias multipliers in tenths, from the outermost ring inward (×0.5, ×0.7, ×1.2, ×1.8, ×2.5)
pub const BIAS_TENTHS: [u64; 5] = [5, 7, 12, 18, 25];

/// Bias of the tier at `index` among `tier_count` tiers.
///
/// The ring is the distance to the nearer edge, so the table is symmetric
/// around the median tier. Rings past the end of the table use the innermost
/// multiplier.
pub fn bias_tenths(index: usize, tier_count: usize) -> u64 {
    let ring = index.min(tier_count.saturating_sub(1).saturating_sub(index));
    BIAS_TENTHS[ring.min(BIAS_TENTHS.len() - 1)]
}

/// Pick one tier index among those with remaining capacity
pub fn select_tier<R: DrawRng + ?Sized>(
    quotas: &QuotaState,
    rng: &mut R,
) -> Result<usize, ExhaustionError> {
    let tier_count = quotas.tier_count();
    let candidates: Vec<(usize, u64)> = (0..tier_count)
        .filter_map(|index| {
            let remaining = quotas.tier_remaining_at(index) as u64;
            (remaining > 0).then(|| (index, remaining * bias_tenths(index, tier_count)))
        })
        .collect();

    rng.pick_weighted(&candidates).ok_or(ExhaustionError::NoTier)
}
