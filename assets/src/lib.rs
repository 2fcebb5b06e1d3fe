//! Reference tier and variant layout.
//!
//! Nine bell-curve tiers over six categories of 26 variants each, for a
//! population of 10,000. The data lives in `data/reference.json` and is
//! compiled into a static document by build.rs.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use raritygen_core::{ConfigurationError, Loaded};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/reference_generated.rs"));
}

pub use generated::{reference_document, CATEGORY_IDS, TIER_IDS};

/// Validate the reference document.
///
/// The reference layout is loaded with the `reject` feasibility policy, so
/// this only succeeds if every tier can be completed.
pub fn reference_configuration() -> Result<Loaded, ConfigurationError> {
    raritygen_core::Configuration::from_document(reference_document())
}
