//! Load-time feasibility analysis
//!
//! Independent per-category sampling can only ever finish a tier if (a) some
//! one-per-category combination of the tier's tagged variants lands inside
//! its score range, and (b) every category carries exactly as much tagged
//! variant quota as the tier itself. Neither is enforced by the sampler, so
//! this module checks both up front.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;

/// Caps the reachable-sum set per tier; beyond this the tier is assumed reachable.
const MAX_TRACKED_SUMS: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeasibilityIssue {
    /// A tier with quota has no drawable variant in a category
    NoTaggedVariant { tier: String, category: String },
    /// No combination of tagged variants sums into the tier's range
    NoCombinationInRange {
        tier: String,
        min: i32,
        max: i32,
        lowest_sum: i32,
        highest_sum: i32,
    },
    /// Tagged variant quota in a category differs from the tier quota
    TaggedQuotaMismatch {
        tier: String,
        category: String,
        tier_quota: u32,
        tagged_quota: u64,
    },
}

impl fmt::Display for FeasibilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeasibilityIssue::NoTaggedVariant { tier, category } => {
                write!(f, "tier `{tier}` has no variant with quota in category `{category}`")
            }
            FeasibilityIssue::NoCombinationInRange {
                tier,
                min,
                max,
                lowest_sum,
                highest_sum,
            } => write!(
                f,
                "tier `{tier}` range [{min}, {max}] is unreachable (sums span {lowest_sum}..={highest_sum})"
            ),
            FeasibilityIssue::TaggedQuotaMismatch {
                tier,
                category,
                tier_quota,
                tagged_quota,
            } => write!(
                f,
                "tier `{tier}` has quota {tier_quota} but its variants in `{category}` total {tagged_quota}"
            ),
        }
    }
}

/// Check every tier with nonzero quota
pub fn analyze(config: &Configuration) -> Vec<FeasibilityIssue> {
    let mut issues = Vec::new();

    for (tier_index, tier) in config.tiers().iter().enumerate() {
        if tier.quota == 0 {
            continue;
        }

        let mut reachable = BTreeSet::from([0i32]);
        let mut saturated = false;

        for category in config.categories() {
            let tagged = category.tagged(tier_index);

            let tagged_quota: u64 = tagged
                .iter()
                .map(|&v| category.variants[v].quota as u64)
                .sum();
            if tagged_quota != tier.quota as u64 {
                issues.push(FeasibilityIssue::TaggedQuotaMismatch {
                    tier: tier.id.clone(),
                    category: category.id.clone(),
                    tier_quota: tier.quota,
                    tagged_quota,
                });
            }

            // Zero-quota variants can never be drawn
            let points: BTreeSet<i32> = tagged
                .iter()
                .map(|&v| &category.variants[v])
                .filter(|variant| variant.quota > 0)
                .map(|variant| variant.points)
                .collect();
            if points.is_empty() {
                issues.push(FeasibilityIssue::NoTaggedVariant {
                    tier: tier.id.clone(),
                    category: category.id.clone(),
                });
                saturated = true;
                continue;
            }

            if saturated {
                continue;
            }

            reachable = reachable
                .iter()
                .flat_map(|sum| points.iter().map(move |p| sum.saturating_add(*p)))
                .collect();
            if reachable.len() > MAX_TRACKED_SUMS {
                log::debug!(
                    "feasibility: tier {} has too many reachable sums to track",
                    tier.id
                );
                saturated = true;
            }
        }

        if saturated {
            continue;
        }

        let range = tier.score_range;
        if reachable.range(range.min..=range.max).next().is_none() {
            issues.push(FeasibilityIssue::NoCombinationInRange {
                tier: tier.id.clone(),
                min: range.min,
                max: range.max,
                lowest_sum: reachable.first().copied().unwrap_or_default(),
                highest_sum: reachable.last().copied().unwrap_or_default(),
            });
        }
    }

    issues
}
