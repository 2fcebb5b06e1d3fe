//! Score computation and range checks

use crate::config::Configuration;
use crate::variant::Pick;

/// Sum of the configured points of every picked variant
pub fn score(config: &Configuration, picks: &[Pick]) -> i32 {
    picks
        .iter()
        .map(|pick| config.categories()[pick.category].variants[pick.variant].points)
        .sum()
}

/// Whether `score` lies inside the tier's inclusive range
pub fn in_range(config: &Configuration, tier: usize, score: i32) -> bool {
    config.tiers()[tier].score_range.contains(score)
}
