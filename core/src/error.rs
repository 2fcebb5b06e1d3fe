//! Error types for allocation
//!
//! Configuration and completion errors are fatal for a run. Exhaustion and
//! range mismatches are per-attempt conditions that the generator retries.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feasibility::FeasibilityIssue;

/// A malformed or incomplete configuration document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("configuration has no tiers")]
    MissingTiers,
    #[error("configuration has no categories")]
    MissingCategories,
    #[error("tier #{index} is missing `{field}`")]
    TierFieldMissing { index: usize, field: &'static str },
    #[error("tier `{tier}` has an inverted score range [{min}, {max}]")]
    InvertedRange { tier: String, min: i32, max: i32 },
    #[error("duplicate tier id `{0}`")]
    DuplicateTier(String),
    #[error("expected {expected} categories, found {found}")]
    CategoryCount { expected: usize, found: usize },
    #[error("category #{index} is missing `id`")]
    CategoryIdMissing { index: usize },
    #[error("duplicate category id `{0}`")]
    DuplicateCategory(String),
    #[error("category `{category}` has {found} variants, expected {expected}")]
    VariantCount {
        category: String,
        expected: usize,
        found: usize,
    },
    #[error("variant #{index} of category `{category}` is missing `{field}`")]
    VariantFieldMissing {
        category: String,
        index: usize,
        field: &'static str,
    },
    #[error("duplicate variant id `{variant}` in category `{category}`")]
    DuplicateVariant { category: String, variant: String },
    #[error("variant `{variant}` in category `{category}` references unknown tier `{tier}`")]
    UnknownTier {
        category: String,
        variant: String,
        tier: String,
    },
    #[error("configuration is infeasible ({} issue(s)), first: {}", .0.len(), first_issue(.0))]
    Infeasible(Vec<FeasibilityIssue>),
}

fn first_issue(issues: &[FeasibilityIssue]) -> String {
    issues
        .first()
        .map(|issue| format!("{issue}"))
        .unwrap_or_default()
}

/// No eligible candidate for a draw
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExhaustionError {
    /// Every tier has zero remaining capacity
    #[error("no tier has remaining capacity")]
    NoTier,
    /// No variant tagged for the tier has remaining capacity in the category
    #[error("no variant for tier `{tier}` remains in category `{category}`")]
    NoVariant { tier: String, category: String },
}

/// Misuse of [`QuotaState::commit`](crate::quota::QuotaState::commit)
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuotaError {
    #[error("tier index {index} is out of bounds")]
    UnknownTier { index: usize },
    #[error("variant {category}:{variant} is out of bounds")]
    UnknownVariant { category: usize, variant: usize },
    #[error("category #{category} was picked more than once")]
    RepeatedCategory { category: usize },
    #[error("tier `{tier}` has no remaining capacity")]
    TierExhausted { tier: String },
    #[error("variant `{variant}` in category `{category}` has no remaining capacity")]
    VariantExhausted { category: String, variant: String },
}

/// Why a single attempt did not commit
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum AttemptError {
    #[error(transparent)]
    Exhausted(#[from] ExhaustionError),
    #[error("score {score} is outside tier `{tier}` range [{min}, {max}]")]
    RangeMismatch {
        tier: String,
        score: i32,
        min: i32,
        max: i32,
    },
    #[error(transparent)]
    Quota(#[from] QuotaError),
}

/// A counter left with remaining capacity after a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Leftover {
    Tier {
        tier: String,
        remaining: u32,
    },
    Variant {
        category: String,
        variant: String,
        remaining: u32,
    },
}

impl fmt::Display for Leftover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leftover::Tier { tier, remaining } => write!(f, "tier {tier}={remaining}"),
            Leftover::Variant {
                category,
                variant,
                remaining,
            } => write!(f, "variant {category}/{variant}={remaining}"),
        }
    }
}

/// The run did not consume every quota exactly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("population incomplete, remaining capacity: {}", join_leftovers(.leftovers))]
    Incomplete { leftovers: Vec<Leftover> },
}

impl ValidationError {
    pub fn leftovers(&self) -> &[Leftover] {
        match self {
            ValidationError::Incomplete { leftovers } => leftovers,
        }
    }
}

fn join_leftovers(leftovers: &[Leftover]) -> String {
    let parts: Vec<String> = leftovers.iter().map(|l| format!("{l}")).collect();
    parts.join(", ")
}

/// Failure to split a configuration into shards
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    #[error("shard count must be at least 1")]
    ZeroShards,
    #[error("cannot split a population of {population} into {shards} shards")]
    TooManyShards { shards: u32, population: u32 },
    #[error("shard {shard} cannot complete: {}", first_issue(.issues))]
    Infeasible {
        shard: usize,
        issues: Vec<FeasibilityIssue>,
    },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Failure reading a configuration document from disk or text
#[cfg(feature = "std")]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration document")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
