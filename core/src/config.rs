//! Configuration model
//!
//! A [`ConfigDocument`] is the raw, serde-facing description of a population.
//! Every field is optional so that the loader, not the deserializer, decides
//! what is missing and reports it as a [`ConfigurationError`]. A successfully
//! loaded [`Configuration`] is immutable for the rest of its life.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::feasibility::{self, FeasibilityIssue};

/// Population size used when the document does not set one
pub const DEFAULT_POPULATION_SIZE: u32 = 10_000;
/// Number of categories every configuration must declare by default
pub const DEFAULT_CATEGORY_COUNT: usize = 6;
/// Number of variants every category must declare by default
pub const DEFAULT_VARIANTS_PER_CATEGORY: usize = 26;

/// What to do when the load-time feasibility analysis finds problems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeasibilityPolicy {
    /// Skip the analysis entirely
    Off,
    /// Report issues as warnings and keep going
    #[default]
    Warn,
    /// Refuse the configuration
    Reject,
}

/// Raw configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_category_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants_per_category: Option<usize>,
    #[serde(default)]
    pub feasibility_check: FeasibilityPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<TierEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u32>,
    /// Inclusive `[min, max]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_range: Option<(i32, i32)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u32>,
}

/// Inclusive score range of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: i32,
    pub max: i32,
}

impl ScoreRange {
    pub fn contains(&self, score: i32) -> bool {
        self.min <= score && score <= self.max
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSpec {
    pub id: String,
    pub name: String,
    pub quota: u32,
    pub score_range: ScoreRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    pub id: String,
    /// Index of the owning tier in [`Configuration::tiers`]
    pub tier: usize,
    pub points: i32,
    pub quota: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub id: String,
    pub variants: Vec<VariantSpec>,
    /// Variant indices grouped by owning tier index
    tagged: Vec<Vec<usize>>,
}

impl CategorySpec {
    /// Indices of the variants tagged for `tier`, in configured order
    pub fn tagged(&self, tier: usize) -> &[usize] {
        self.tagged.get(tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn variant_index(&self, id: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.id == id)
    }
}

/// Non-fatal findings produced while loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigWarning {
    /// Tier quotas do not add up to the population size
    TierQuotaSum { expected: u32, found: u64 },
    /// Variant quotas of a category do not add up to the population size
    CategoryQuotaSum {
        category: String,
        expected: u32,
        found: u64,
    },
    Feasibility { issue: FeasibilityIssue },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::TierQuotaSum { expected, found } => write!(
                f,
                "tier quotas sum to {found}, population size is {expected}"
            ),
            ConfigWarning::CategoryQuotaSum {
                category,
                expected,
                found,
            } => write!(
                f,
                "variant quotas of category `{category}` sum to {found}, population size is {expected}"
            ),
            ConfigWarning::Feasibility { issue } => write!(f, "{issue}"),
        }
    }
}

/// A validated configuration and whatever warnings loading produced
#[derive(Debug, Clone)]
pub struct Loaded {
    pub configuration: Configuration,
    pub warnings: Vec<ConfigWarning>,
}

/// Validated, immutable description of tiers and categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    population_size: u32,
    expected_category_count: usize,
    variants_per_category: usize,
    feasibility_check: FeasibilityPolicy,
    tiers: Vec<TierSpec>,
    categories: Vec<CategorySpec>,
}

impl Configuration {
    /// Validate a raw document.
    ///
    /// Fails fast on the first structural problem. Quota sums that disagree
    /// with the population size only produce warnings, which are also logged.
    pub fn from_document(doc: ConfigDocument) -> Result<Loaded, ConfigurationError> {
        let population_size = doc.population_size.unwrap_or(DEFAULT_POPULATION_SIZE);
        let expected_category_count = doc
            .expected_category_count
            .unwrap_or(DEFAULT_CATEGORY_COUNT);
        let variants_per_category = doc
            .variants_per_category
            .unwrap_or(DEFAULT_VARIANTS_PER_CATEGORY);

        let raw_tiers = doc.tiers.filter(|t| !t.is_empty());
        let raw_tiers = raw_tiers.ok_or(ConfigurationError::MissingTiers)?;
        let raw_categories = doc.categories.filter(|c| !c.is_empty());
        let raw_categories = raw_categories.ok_or(ConfigurationError::MissingCategories)?;

        let tiers = build_tiers(raw_tiers)?;

        if raw_categories.len() != expected_category_count {
            return Err(ConfigurationError::CategoryCount {
                expected: expected_category_count,
                found: raw_categories.len(),
            });
        }

        let mut seen = BTreeSet::new();
        let mut categories = Vec::with_capacity(raw_categories.len());
        for (index, raw) in raw_categories.into_iter().enumerate() {
            let category = build_category(index, raw, &tiers, variants_per_category)?;
            if !seen.insert(category.id.clone()) {
                return Err(ConfigurationError::DuplicateCategory(category.id));
            }
            categories.push(category);
        }

        let configuration = Self {
            population_size,
            expected_category_count,
            variants_per_category,
            feasibility_check: doc.feasibility_check,
            tiers,
            categories,
        };

        let mut warnings = configuration.quota_sum_warnings();
        match configuration.feasibility_check {
            FeasibilityPolicy::Off => {}
            FeasibilityPolicy::Warn => warnings.extend(
                feasibility::analyze(&configuration)
                    .into_iter()
                    .map(|issue| ConfigWarning::Feasibility { issue }),
            ),
            FeasibilityPolicy::Reject => {
                let issues = feasibility::analyze(&configuration);
                if !issues.is_empty() {
                    return Err(ConfigurationError::Infeasible(issues));
                }
            }
        }

        for warning in &warnings {
            log::warn!("configuration: {}", warning);
        }

        Ok(Loaded {
            configuration,
            warnings,
        })
    }

    /// Parse and validate a JSON document
    #[cfg(feature = "std")]
    pub fn from_json_str(json: &str) -> Result<Loaded, crate::error::LoadError> {
        let doc: ConfigDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(doc)?)
    }

    /// Read, parse and validate a JSON document from disk
    #[cfg(feature = "std")]
    pub fn from_path(path: &std::path::Path) -> Result<Loaded, crate::error::LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| crate::error::LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Convert back into a raw document that loads to an equal configuration
    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            population_size: Some(self.population_size),
            expected_category_count: Some(self.expected_category_count),
            variants_per_category: Some(self.variants_per_category),
            feasibility_check: self.feasibility_check,
            tiers: Some(
                self.tiers
                    .iter()
                    .map(|tier| TierEntry {
                        id: Some(tier.id.clone()),
                        name: Some(tier.name.clone()),
                        quota: Some(tier.quota),
                        score_range: Some((tier.score_range.min, tier.score_range.max)),
                    })
                    .collect(),
            ),
            categories: Some(
                self.categories
                    .iter()
                    .map(|category| CategoryEntry {
                        id: Some(category.id.clone()),
                        variants: category
                            .variants
                            .iter()
                            .map(|variant| VariantEntry {
                                id: Some(variant.id.clone()),
                                tier: Some(self.tiers[variant.tier].id.clone()),
                                points: Some(variant.points),
                                quota: Some(variant.quota),
                            })
                            .collect(),
                    })
                    .collect(),
            ),
        }
    }

    pub fn population_size(&self) -> u32 {
        self.population_size
    }

    pub fn feasibility_check(&self) -> FeasibilityPolicy {
        self.feasibility_check
    }

    pub fn tiers(&self) -> &[TierSpec] {
        &self.tiers
    }

    pub fn categories(&self) -> &[CategorySpec] {
        &self.categories
    }

    pub fn tier_index(&self, id: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.id == id)
    }

    pub fn category_index(&self, id: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.id == id)
    }

    fn quota_sum_warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let expected = self.population_size;

        let tier_sum: u64 = self.tiers.iter().map(|t| t.quota as u64).sum();
        if tier_sum != expected as u64 {
            warnings.push(ConfigWarning::TierQuotaSum {
                expected,
                found: tier_sum,
            });
        }

        for category in &self.categories {
            let sum: u64 = category.variants.iter().map(|v| v.quota as u64).sum();
            if sum != expected as u64 {
                warnings.push(ConfigWarning::CategoryQuotaSum {
                    category: category.id.clone(),
                    expected,
                    found: sum,
                });
            }
        }

        warnings
    }
}

fn build_tiers(raw_tiers: Vec<TierEntry>) -> Result<Vec<TierSpec>, ConfigurationError> {
    let mut seen = BTreeSet::new();
    let mut tiers = Vec::with_capacity(raw_tiers.len());

    for (index, raw) in raw_tiers.into_iter().enumerate() {
        let missing = |field| ConfigurationError::TierFieldMissing { index, field };
        let id = raw.id.filter(|id| !id.is_empty()).ok_or(missing("id"))?;
        let (min, max) = raw.score_range.ok_or(missing("scoreRange"))?;
        let quota = raw.quota.ok_or(missing("quota"))?;

        if min > max {
            return Err(ConfigurationError::InvertedRange { tier: id, min, max });
        }
        if !seen.insert(id.clone()) {
            return Err(ConfigurationError::DuplicateTier(id));
        }

        tiers.push(TierSpec {
            name: raw.name.unwrap_or_else(|| id.clone()),
            id,
            quota,
            score_range: ScoreRange { min, max },
        });
    }

    Ok(tiers)
}

fn build_category(
    index: usize,
    raw: CategoryEntry,
    tiers: &[TierSpec],
    variants_per_category: usize,
) -> Result<CategorySpec, ConfigurationError> {
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .ok_or(ConfigurationError::CategoryIdMissing { index })?;

    if raw.variants.len() != variants_per_category {
        return Err(ConfigurationError::VariantCount {
            category: id,
            expected: variants_per_category,
            found: raw.variants.len(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut variants = Vec::with_capacity(raw.variants.len());
    let mut tagged = vec![Vec::new(); tiers.len()];

    for (variant_index, raw_variant) in raw.variants.into_iter().enumerate() {
        let missing = |field| ConfigurationError::VariantFieldMissing {
            category: id.clone(),
            index: variant_index,
            field,
        };
        let variant_id = raw_variant
            .id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing("id"))?;
        let tier_id = raw_variant.tier.ok_or_else(|| missing("tier"))?;
        let points = raw_variant.points.ok_or_else(|| missing("points"))?;
        let quota = raw_variant.quota.ok_or_else(|| missing("quota"))?;

        let tier = tiers.iter().position(|t| t.id == tier_id).ok_or_else(|| {
            ConfigurationError::UnknownTier {
                category: id.clone(),
                variant: variant_id.clone(),
                tier: tier_id.clone(),
            }
        })?;
        if !seen.insert(variant_id.clone()) {
            return Err(ConfigurationError::DuplicateVariant {
                category: id,
                variant: variant_id,
            });
        }

        tagged[tier].push(variants.len());
        variants.push(VariantSpec {
            id: variant_id,
            tier,
            points,
            quota,
        });
    }

    Ok(CategorySpec {
        id,
        variants,
        tagged,
    })
}
