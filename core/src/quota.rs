//! Remaining-capacity counters for one generation run

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::{Leftover, QuotaError};
use crate::variant::Pick;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Counter {
    id: String,
    remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryCounters {
    id: String,
    variants: Vec<Counter>,
}

/// Deep, mutable copy of every tier and variant quota.
///
/// Counters are laid out in configuration order, so the index-based reads
/// used by the selectors line up with [`Configuration`] indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaState {
    tiers: Vec<Counter>,
    categories: Vec<CategoryCounters>,
}

impl QuotaState {
    pub fn initialize(config: &Configuration) -> Self {
        let tiers = config
            .tiers()
            .iter()
            .map(|tier| Counter {
                id: tier.id.clone(),
                remaining: tier.quota,
            })
            .collect();
        let categories = config
            .categories()
            .iter()
            .map(|category| CategoryCounters {
                id: category.id.clone(),
                variants: category
                    .variants
                    .iter()
                    .map(|variant| Counter {
                        id: variant.id.clone(),
                        remaining: variant.quota,
                    })
                    .collect(),
            })
            .collect();

        Self { tiers, categories }
    }

    pub fn remaining_tier(&self, tier_id: &str) -> Option<u32> {
        self.tiers
            .iter()
            .find(|t| t.id == tier_id)
            .map(|t| t.remaining)
    }

    pub fn remaining_variant(&self, category_id: &str, variant_id: &str) -> Option<u32> {
        self.categories
            .iter()
            .find(|c| c.id == category_id)?
            .variants
            .iter()
            .find(|v| v.id == variant_id)
            .map(|v| v.remaining)
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Remaining capacity of the tier at `index`, 0 when out of bounds
    pub fn tier_remaining_at(&self, index: usize) -> u32 {
        self.tiers.get(index).map(|t| t.remaining).unwrap_or(0)
    }

    /// Remaining capacity of a variant by indices, 0 when out of bounds
    pub fn variant_remaining_at(&self, category: usize, variant: usize) -> u32 {
        self.categories
            .get(category)
            .and_then(|c| c.variants.get(variant))
            .map(|v| v.remaining)
            .unwrap_or(0)
    }

    /// Items still to be committed across all tiers
    pub fn remaining_population(&self) -> u64 {
        self.tiers.iter().map(|t| t.remaining as u64).sum()
    }

    /// Decrement the tier and every picked variant by one.
    ///
    /// All counters are checked before any is touched, so a rejected commit
    /// leaves the state unchanged.
    pub fn commit(&mut self, tier: usize, picks: &[Pick]) -> Result<(), QuotaError> {
        let tier_counter = self
            .tiers
            .get(tier)
            .ok_or(QuotaError::UnknownTier { index: tier })?;
        if tier_counter.remaining == 0 {
            return Err(QuotaError::TierExhausted {
                tier: tier_counter.id.clone(),
            });
        }

        let mut picked = vec![false; self.categories.len()];
        for pick in picks {
            let category = self
                .categories
                .get(pick.category)
                .ok_or(QuotaError::UnknownVariant {
                    category: pick.category,
                    variant: pick.variant,
                })?;
            let counter = category
                .variants
                .get(pick.variant)
                .ok_or(QuotaError::UnknownVariant {
                    category: pick.category,
                    variant: pick.variant,
                })?;
            if picked[pick.category] {
                return Err(QuotaError::RepeatedCategory {
                    category: pick.category,
                });
            }
            picked[pick.category] = true;
            if counter.remaining == 0 {
                return Err(QuotaError::VariantExhausted {
                    category: category.id.clone(),
                    variant: counter.id.clone(),
                });
            }
        }

        self.tiers[tier].remaining -= 1;
        for pick in picks {
            self.categories[pick.category].variants[pick.variant].remaining -= 1;
        }
        Ok(())
    }

    /// Every counter with capacity left, tiers first
    pub fn leftovers(&self) -> Vec<Leftover> {
        let tiers = self
            .tiers
            .iter()
            .filter(|t| t.remaining > 0)
            .map(|t| Leftover::Tier {
                tier: t.id.clone(),
                remaining: t.remaining,
            });
        let variants = self.categories.iter().flat_map(|c| {
            c.variants
                .iter()
                .filter(|v| v.remaining > 0)
                .map(move |v| Leftover::Variant {
                    category: c.id.clone(),
                    variant: v.id.clone(),
                    remaining: v.remaining,
                })
        });
        tiers.chain(variants).collect()
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            tiers: self
                .tiers
                .iter()
                .map(|t| TierRemaining {
                    tier: t.id.clone(),
                    remaining: t.remaining,
                })
                .collect(),
            variants: self
                .categories
                .iter()
                .flat_map(|c| {
                    c.variants.iter().map(move |v| VariantRemaining {
                        category: c.id.clone(),
                        variant: v.id.clone(),
                        remaining: v.remaining,
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct TierRemaining {
    pub tier: String,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct VariantRemaining {
    pub category: String,
    pub variant: String,
    pub remaining: u32,
}

/// Point-in-time copy of every remaining counter, for progress reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    pub tiers: Vec<TierRemaining>,
    pub variants: Vec<VariantRemaining>,
}

impl QuotaSnapshot {
    pub fn remaining_population(&self) -> u64 {
        self.tiers.iter().map(|t| t.remaining as u64).sum()
    }
}
