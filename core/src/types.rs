use alloc::string::String;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::AttemptError;

/// One category's chosen variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub category: String,
    pub variant: String,
    pub points: i32,
}

/// A committed item, consumed by metadata and rendering collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Position of the item in the run, starting at 0
    pub index: u32,
    pub tier: String,
    pub tier_name: String,
    pub score: i32,
    /// One entry per category, in configured category order
    pub selections: Vec<Selection>,
    /// Attempts spent on this item, including the committed one
    pub attempts: u32,
}

/// An item that exhausted its retry budget without committing
///
/// Serde only: the last error may carry index positions, which have no SCALE
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFailure {
    pub index: u32,
    pub attempts: u32,
    pub last_error: AttemptError,
}

/// Outcome of generating one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ItemOutcome {
    Committed(GenerationResult),
    Failed(GenerationFailure),
}

impl ItemOutcome {
    pub fn index(&self) -> u32 {
        match self {
            ItemOutcome::Committed(result) => result.index,
            ItemOutcome::Failed(failure) => failure.index,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ItemOutcome::Committed(result) => result.attempts,
            ItemOutcome::Failed(failure) => failure.attempts,
        }
    }

    pub fn committed(&self) -> Option<&GenerationResult> {
        match self {
            ItemOutcome::Committed(result) => Some(result),
            ItemOutcome::Failed(_) => None,
        }
    }
}

/// Running totals for operator-facing progress reporting
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TypeInfo,
)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Items attempted so far, committed or failed
    pub items: u32,
    pub committed: u32,
    pub failed: u32,
    /// Attempts across all items
    pub attempts: u64,
    pub range_mismatches: u64,
    pub exhaustions: u64,
    pub remaining_population: u64,
}
