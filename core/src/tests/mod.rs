mod generation;

use crate::config::{CategoryEntry, ConfigDocument, Configuration, TierEntry, VariantEntry};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

pub(crate) fn tier(id: &str, quota: u32, min: i32, max: i32) -> TierEntry {
    TierEntry {
        id: Some(id.to_string()),
        name: Some(format!("{id} tier")),
        quota: Some(quota),
        score_range: Some((min, max)),
    }
}

pub(crate) fn variant(id: &str, tier: &str, points: i32, quota: u32) -> VariantEntry {
    VariantEntry {
        id: Some(id.to_string()),
        tier: Some(tier.to_string()),
        points: Some(points),
        quota: Some(quota),
    }
}

pub(crate) fn category(id: &str, variants: Vec<VariantEntry>) -> CategoryEntry {
    CategoryEntry {
        id: Some(id.to_string()),
        variants,
    }
}

/// Document whose expected counts match the categories given
pub(crate) fn document(
    population: u32,
    tiers: Vec<TierEntry>,
    categories: Vec<CategoryEntry>,
) -> ConfigDocument {
    ConfigDocument {
        population_size: Some(population),
        expected_category_count: Some(categories.len()),
        variants_per_category: Some(categories.first().map(|c| c.variants.len()).unwrap_or(0)),
        tiers: Some(tiers),
        categories: Some(categories),
        ..ConfigDocument::default()
    }
}

pub(crate) fn load(doc: ConfigDocument) -> Configuration {
    Configuration::from_document(doc)
        .expect("test configuration should load")
        .configuration
}

/// Three tiers over two categories, every combination in range.
///
/// | tier | quota | range  | per-category variants (points x quota) |
/// |------|-------|--------|----------------------------------------|
/// | L    | 4     | [2, 2] | 1 x 4                                  |
/// | M    | 12    | [4, 8] | 2 x 6, 4 x 6                           |
/// | H    | 4     | [10,10]| 5 x 4                                  |
pub(crate) fn three_tier_config() -> Configuration {
    let slot = |name: &str| {
        category(
            name,
            vec![
                variant(&format!("{name}-l"), "L", 1, 4),
                variant(&format!("{name}-m1"), "M", 2, 6),
                variant(&format!("{name}-m2"), "M", 4, 6),
                variant(&format!("{name}-h"), "H", 5, 4),
            ],
        )
    };
    load(document(
        20,
        vec![tier("L", 4, 2, 2), tier("M", 12, 4, 8), tier("H", 4, 10, 10)],
        vec![slot("head"), slot("body")],
    ))
}

/// Two categories where half of the mid and high combinations miss the range.
///
/// | tier | quota | range  | per-category variants (points x quota) |
/// |------|-------|--------|----------------------------------------|
/// | low  | 10    | [2, 2] | 1 x 10                                 |
/// | mid  | 40    | [4, 4] | 1 x 20, 3 x 20                         |
/// | high | 10    | [9, 9] | 4 x 5, 5 x 5                           |
///
/// Only mixed pairs commit in mid and high, so the remaining low-point count
/// in one category always equals the high-point count in the other and a
/// valid pair stays drawable until the tier is spent.
pub(crate) fn mixed_pair_config() -> Configuration {
    let slot = |name: &str| {
        category(
            name,
            vec![
                variant(&format!("{name}-l"), "low", 1, 10),
                variant(&format!("{name}-m1"), "mid", 1, 20),
                variant(&format!("{name}-m3"), "mid", 3, 20),
                variant(&format!("{name}-h4"), "high", 4, 5),
                variant(&format!("{name}-h5"), "high", 5, 5),
            ],
        )
    };
    load(document(
        60,
        vec![tier("low", 10, 2, 2), tier("mid", 40, 4, 4), tier("high", 10, 9, 9)],
        vec![slot("head"), slot("body")],
    ))
}

/// Tier quotas of the 9-tier bell-curve layout
pub(crate) const BELL_QUOTAS: [u32; 9] = [10, 100, 500, 2390, 4000, 2390, 500, 100, 10];

/// Nine tiers, six categories of 26 variants, population 10,000.
///
/// Variant counts per tier are `[1, 2, 3, 4, 6, 4, 3, 2, 1]`. Variant `j` of
/// tier `k` is worth `BASE[k] + j` points and each tier's range spans every
/// reachable sum, with single-point ranges on the extremal tiers.
pub(crate) fn bell_config() -> Configuration {
    const COUNTS: [u32; 9] = [1, 2, 3, 4, 6, 4, 3, 2, 1];
    const BASE: [i32; 9] = [1, 3, 6, 10, 15, 22, 27, 31, 34];
    const CATEGORIES: [&str; 6] = ["background", "body", "headwear", "eyewear", "outfit", "accessory"];

    let tiers = (0..9)
        .map(|k| {
            let min = 6 * BASE[k];
            let max = 6 * (BASE[k] + COUNTS[k] as i32 - 1);
            tier(&format!("T{}", k + 1), BELL_QUOTAS[k], min, max)
        })
        .collect();

    let categories = CATEGORIES
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let mut variants = Vec::new();
            for k in 0..9 {
                let count = COUNTS[k];
                let base = BELL_QUOTAS[k] / count;
                let extra = BELL_QUOTAS[k] % count;
                for j in 0..count {
                    // Rotate the remainder so categories differ slightly
                    let quota = base + u32::from((j + c as u32) % count < extra);
                    variants.push(variant(
                        &format!("{name}-t{}-{}", k + 1, j + 1),
                        &format!("T{}", k + 1),
                        BASE[k] + j as i32,
                        quota,
                    ));
                }
            }
            category(name, variants)
        })
        .collect();

    load(document(10_000, tiers, categories))
}
