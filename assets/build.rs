//! Build script: reads data/reference.json and generates Rust source code
//! that statically constructs the reference configuration document.
//! This lets the assets crate embed the layout without any runtime JSON
//! parsing, keeping it fully no_std compatible.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

// ── JSON schema types (build-time only) ──────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonReference {
    population_size: u32,
    expected_category_count: usize,
    variants_per_category: usize,
    feasibility_check: String,
    tiers: Vec<JsonTier>,
    categories: Vec<JsonCategory>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonTier {
    id: String,
    name: String,
    quota: u32,
    score_range: (i32, i32),
}

#[derive(Deserialize)]
struct JsonCategory {
    id: String,
    variants: Vec<JsonVariant>,
}

#[derive(Deserialize)]
struct JsonVariant {
    id: String,
    tier: String,
    points: i32,
    quota: u32,
}

// ── Code generation helpers ──────────────────────────────────────────────────

fn gen_policy(policy: &str) -> &'static str {
    match policy {
        "off" => "FeasibilityPolicy::Off",
        "warn" => "FeasibilityPolicy::Warn",
        "reject" => "FeasibilityPolicy::Reject",
        other => panic!("Unknown feasibilityCheck: {other}"),
    }
}

fn gen_tier(tier: &JsonTier) -> String {
    let JsonTier {
        id,
        name,
        quota,
        score_range: (min, max),
    } = tier;
    format!(
        r#"        TierEntry {{
            id: Some(String::from("{id}")),
            name: Some(String::from("{name}")),
            quota: Some({quota}),
            score_range: Some(({min}, {max})),
        }}"#
    )
}

fn gen_variant(variant: &JsonVariant) -> String {
    let JsonVariant {
        id,
        tier,
        points,
        quota,
    } = variant;
    format!(
        r#"VariantEntry {{ id: Some(String::from("{id}")), tier: Some(String::from("{tier}")), points: Some({points}), quota: Some({quota}) }}"#
    )
}

fn gen_category(category: &JsonCategory) -> String {
    let id = &category.id;
    let variants: Vec<String> = category.variants.iter().map(gen_variant).collect();
    format!(
        "        CategoryEntry {{\n            id: Some(String::from(\"{id}\")),\n            variants: vec![\n                {}\n            ],\n        }}",
        variants.join(",\n                ")
    )
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let reference_path = Path::new(&manifest_dir).join("data/reference.json");

    // Tell Cargo to re-run if the JSON file changes
    println!("cargo:rerun-if-changed={}", reference_path.display());

    let reference_json = fs::read_to_string(&reference_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", reference_path.display()));
    let reference: JsonReference =
        serde_json::from_str(&reference_json).expect("Failed to parse reference.json");

    let tier_entries: Vec<String> = reference.tiers.iter().map(gen_tier).collect();
    let category_entries: Vec<String> = reference.categories.iter().map(gen_category).collect();

    // Id tables for callers that only need names
    let tier_ids: Vec<String> = reference
        .tiers
        .iter()
        .map(|t| format!("\"{}\"", t.id))
        .collect();
    let category_ids: Vec<String> = reference
        .categories
        .iter()
        .map(|c| format!("\"{}\"", c.id))
        .collect();

    // ── Write output ─────────────────────────────────────────────────────────
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest = Path::new(&out_dir).join("reference_generated.rs");

    let generated = format!(
        r#"// Auto-generated from reference.json, DO NOT EDIT
use alloc::string::String;
use alloc::vec;
use raritygen_core::config::{{
    CategoryEntry, ConfigDocument, FeasibilityPolicy, TierEntry, VariantEntry,
}};

/// Tier ids of the reference layout, lowest score first.
pub const TIER_IDS: [&str; {tier_count}] = [{tier_ids}];

/// Category ids of the reference layout, in draw order.
pub const CATEGORY_IDS: [&str; {category_count}] = [{category_ids}];

/// Returns the reference document defined in reference.json.
pub fn reference_document() -> ConfigDocument {{
    ConfigDocument {{
        population_size: Some({population_size}),
        expected_category_count: Some({expected_category_count}),
        variants_per_category: Some({variants_per_category}),
        feasibility_check: {policy},
        tiers: Some(vec![
{tiers}
        ]),
        categories: Some(vec![
{categories}
        ]),
    }}
}}
"#,
        tier_count = tier_ids.len(),
        tier_ids = tier_ids.join(", "),
        category_count = category_ids.len(),
        category_ids = category_ids.join(", "),
        population_size = reference.population_size,
        expected_category_count = reference.expected_category_count,
        variants_per_category = reference.variants_per_category,
        policy = gen_policy(&reference.feasibility_check),
        tiers = tier_entries.join(",\n"),
        categories = category_entries.join(",\n"),
    );

    fs::write(&dest, generated).expect("Failed to write generated reference file");
}
