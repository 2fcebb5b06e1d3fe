//! Quota-exact rarity allocation.
//!
//! Assigns a fixed population of items to rarity tiers and, per item, one
//! variant from every category, so that tier populations and variant usage
//! match their quotas exactly and each item's point sum lands inside its
//! tier's score range.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod feasibility;
pub mod generator;
pub mod quota;
pub mod report;
pub mod rng;
pub mod score;
pub mod shard;
pub mod tier;
pub mod types;
pub mod variant;

#[cfg(test)]
mod tests;

pub use config::{ConfigDocument, Configuration, FeasibilityPolicy, Loaded};
pub use error::*;
pub use generator::{Generator, DEFAULT_MAX_ATTEMPTS};
pub use quota::{QuotaSnapshot, QuotaState};
pub use report::RunReport;
pub use rng::{DrawRng, XorShiftRng};
pub use types::*;
