use core::ops::ControlFlow;

use parity_scale_codec::Encode;

use super::*;
use crate::error::{AttemptError, ExhaustionError, Leftover, ValidationError};
use crate::generator::{Generator, DEFAULT_MAX_ATTEMPTS};
use crate::rng::XorShiftRng;
use crate::types::ItemOutcome;

fn seeded(config: &Configuration, seed: u64) -> Generator<'_, XorShiftRng> {
    Generator::new(config, XorShiftRng::seed_from_u64(seed))
}

/// One tier whose range no combination can reach
fn unreachable_config() -> Configuration {
    load(document(
        1,
        vec![tier("A", 1, 100, 100)],
        vec![category("x", vec![variant("x1", "A", 1, 1)])],
    ))
}

#[test]
fn test_full_run_completes_exactly() {
    let config = three_tier_config();
    let mut generator = seeded(&config, 42);
    let report = generator.run_to_completion();

    assert!(report.is_complete(), "{:?}", report.leftovers());
    assert_eq!(generator.validate_completion(), Ok(()));
    assert_eq!(report.validate(), Ok(()));
    assert_eq!(report.results.len(), 20);
    assert!(report.failures.is_empty());
    assert!(!report.stopped);

    // every combination is in range, so nothing is ever retried
    assert_eq!(report.progress.attempts, 20);
    assert_eq!(report.progress.remaining_population, 0);

    for tally in &report.tiers {
        assert_eq!(tally.committed, tally.quota, "tier {}", tally.tier);
    }
    for tally in &report.variants {
        assert_eq!(tally.committed, tally.quota, "variant {}", tally.variant);
    }

    let indices: Vec<u32> = report.results.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());
}

#[test]
fn test_scores_are_point_sums_within_range() {
    let config = three_tier_config();
    let report = seeded(&config, 7).run_to_completion();

    for result in &report.results {
        let sum: i32 = result.selections.iter().map(|s| s.points).sum();
        assert_eq!(result.score, sum);

        let tier = &config.tiers()[config.tier_index(&result.tier).unwrap()];
        assert!(tier.score_range.contains(result.score), "{:?}", result);
        assert_eq!(result.tier_name, tier.name);

        let categories: Vec<&str> = result.selections.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["head", "body"]);
    }
}

#[test]
fn test_single_point_range_commits_exact_sum() {
    let config = three_tier_config();
    let report = seeded(&config, 11).run_to_completion();

    let lows: Vec<_> = report.results.iter().filter(|r| r.tier == "L").collect();
    assert_eq!(lows.len(), 4);
    for result in lows {
        assert_eq!(result.score, 2);
        assert!(result.selections.iter().all(|s| s.variant.ends_with("-l")));
    }
}

#[test]
fn test_same_seed_same_population() {
    let config = three_tier_config();
    let first = seeded(&config, 1234).run_to_completion();
    let second = seeded(&config, 1234).run_to_completion();

    assert_eq!(first.results.encode(), second.results.encode());
    assert_eq!(first, second);
}

#[test]
fn test_selected_counters_always_had_capacity() {
    let config = three_tier_config();
    let mut generator = seeded(&config, 99);

    for _ in 0..config.population_size() {
        let before = generator.quotas().clone();
        let outcome = generator.generate_one();
        let result = outcome.committed().expect("every item commits");

        assert!(before.remaining_tier(&result.tier).unwrap() > 0);
        for selection in &result.selections {
            let remaining = before
                .remaining_variant(&selection.category, &selection.variant)
                .unwrap();
            assert!(remaining > 0, "{} picked at zero", selection.variant);
            assert_eq!(
                generator.quotas()
                    .remaining_variant(&selection.category, &selection.variant),
                Some(remaining - 1)
            );
        }
    }

    let snapshot = generator.quotas().snapshot();
    assert_eq!(snapshot.remaining_population(), 0);
    assert!(snapshot.variants.iter().all(|v| v.remaining == 0));
}

#[test]
fn test_unreachable_range_fails_after_retry_budget() {
    let config = unreachable_config();
    let mut generator = seeded(&config, 3);

    let outcome = generator.generate_one();
    let ItemOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.index, 0);
    assert_eq!(failure.attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(
        failure.last_error,
        AttemptError::RangeMismatch {
            tier: "A".into(),
            score: 1,
            min: 100,
            max: 100,
        }
    );

    // nothing was committed
    assert_eq!(generator.quotas().remaining_tier("A"), Some(1));
    assert_eq!(generator.quotas().remaining_variant("x", "x1"), Some(1));

    let progress = generator.progress();
    assert_eq!(progress.items, 1);
    assert_eq!(progress.failed, 1);
    assert_eq!(progress.committed, 0);
    assert_eq!(progress.range_mismatches, DEFAULT_MAX_ATTEMPTS as u64);
    assert_eq!(progress.remaining_population, 1);
}

#[test]
fn test_retry_budget_is_configurable() {
    let config = unreachable_config();

    let mut generator = seeded(&config, 3).with_max_attempts(5);
    assert_eq!(generator.generate_one().attempts(), 5);

    let mut generator = seeded(&config, 3).with_max_attempts(0);
    assert_eq!(generator.generate_one().attempts(), 1);
}

#[test]
fn test_exhausted_tier_fails_then_batch_continues() {
    // T5 has a slot left in head but none in body
    let config = load(document(
        2,
        vec![tier("T4", 1, 0, 100), tier("T5", 1, 0, 100)],
        vec![
            category("head", vec![variant("head-4", "T4", 1, 1), variant("head-5", "T5", 1, 1)]),
            category("body", vec![variant("body-4", "T4", 1, 1), variant("body-5", "T5", 1, 0)]),
        ],
    ));
    let mut generator = seeded(&config, 8);
    let report = generator.run(3, |_, _| ControlFlow::Continue(()));

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].tier, "T4");
    assert_eq!(report.failures.len(), 2);
    for failure in &report.failures {
        assert_eq!(
            failure.last_error,
            AttemptError::Exhausted(ExhaustionError::NoVariant {
                tier: "T5".into(),
                category: "body".into(),
            })
        );
    }
    assert_eq!(report.failures[1].index, 2);
    assert!(report.progress.exhaustions >= 2 * DEFAULT_MAX_ATTEMPTS as u64);

    assert_eq!(generator.quotas().remaining_tier("T5"), Some(1));
    assert_eq!(generator.quotas().remaining_variant("head", "head-5"), Some(1));

    let err = generator.validate_completion().unwrap_err();
    assert_eq!(
        err.leftovers(),
        &[
            Leftover::Tier {
                tier: "T5".into(),
                remaining: 1
            },
            Leftover::Variant {
                category: "head".into(),
                variant: "head-5".into(),
                remaining: 1
            },
        ]
    );
}

#[test]
fn test_no_tier_left_is_an_exhaustion() {
    let config = three_tier_config();
    let mut generator = seeded(&config, 5);
    generator.run_to_completion();

    let outcome = generator.generate_one();
    assert_eq!(outcome.index(), 20);
    let ItemOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(
        failure.last_error,
        AttemptError::Exhausted(ExhaustionError::NoTier)
    );
}

#[test]
fn test_validator_names_leftover_variant() {
    // Category quotas exceed the population, so one variant is never used
    let config = load(document(
        1,
        vec![tier("A", 1, 0, 10)],
        vec![category("c", vec![variant("c1", "A", 1, 1), variant("c2", "A", 2, 1)])],
    ));
    let mut generator = seeded(&config, 21);
    let report = generator.run_to_completion();
    assert_eq!(report.results.len(), 1);

    let Err(ValidationError::Incomplete { leftovers }) = generator.validate_completion() else {
        panic!("run should be incomplete");
    };
    assert_eq!(leftovers.len(), 1);
    let used = &report.results[0].selections[0].variant;
    let expected_left = if used == "c1" { "c2" } else { "c1" };
    assert_eq!(
        leftovers[0],
        Leftover::Variant {
            category: "c".into(),
            variant: expected_left.into(),
            remaining: 1
        }
    );
    assert_eq!(report.validate(), Err(ValidationError::Incomplete { leftovers }));
}

#[test]
fn test_observer_can_stop_and_resume() {
    let config = three_tier_config();
    let mut generator = seeded(&config, 17);

    let mut seen = Vec::new();
    let first = generator.run(config.population_size(), |outcome, progress| {
        seen.push(outcome.index());
        assert_eq!(progress.items, outcome.index() + 1);
        if progress.items == 5 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    assert!(first.stopped);
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert_eq!(first.results.len(), 5);
    assert_eq!(first.progress.remaining_population, 15);
    assert!(!first.is_complete());

    let rest = generator.run_to_completion();
    assert!(!rest.stopped);
    assert_eq!(rest.results.len(), 15);
    assert_eq!(rest.results[0].index, 5);
    assert_eq!(rest.progress.items, 20);
    assert!(rest.is_complete());
}

#[test]
fn test_combined_shard_reports() {
    let config = three_tier_config();
    let shards = crate::shard::split(&config, 2).unwrap();

    let reports: Vec<_> = shards
        .iter()
        .enumerate()
        .map(|(i, shard)| seeded(shard, 100 + i as u64).run_to_completion())
        .collect();
    let merged = crate::report::RunReport::combine(reports).unwrap();

    assert!(merged.is_complete());
    assert_eq!(merged.results.len(), 20);
    assert_eq!(merged.progress.committed, 20);
    let indices: Vec<u32> = merged.results.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());
    for (tally, tier) in merged.tiers.iter().zip(config.tiers()) {
        assert_eq!(tally.committed, tier.quota);
    }

    assert!(crate::report::RunReport::combine(Vec::new()).is_none());
}

#[test]
fn test_out_of_range_draws_are_retried_until_completion() {
    let config = mixed_pair_config();
    let report = seeded(&config, 21).run_to_completion();

    assert_eq!(report.validate(), Ok(()));
    assert!(report.failures.is_empty());
    assert_eq!(report.results.len(), 60);

    let progress = report.progress;
    assert!(progress.range_mismatches > 0);
    assert_eq!(progress.exhaustions, 0);
    assert_eq!(progress.attempts, 60 + progress.range_mismatches);

    for tally in &report.tiers {
        assert_eq!(tally.committed, tally.quota, "tier {}", tally.tier);
        assert_eq!(tally.remaining, 0);
    }
    for tally in &report.variants {
        assert_eq!(tally.committed, tally.quota, "variant {}", tally.variant);
    }

    for result in &report.results {
        let tier = &config.tiers()[config.tier_index(&result.tier).unwrap()];
        assert!(tier.score_range.contains(result.score), "{:?}", result);
    }
    let retried = report.results.iter().filter(|r| r.attempts > 1).count();
    assert!(retried > 0);
}

#[test]
fn test_sharded_out_of_range_draws_complete() {
    let config = mixed_pair_config();
    let shards = crate::shard::split(&config, 2).unwrap();

    let reports: Vec<_> = shards
        .iter()
        .enumerate()
        .map(|(i, shard)| seeded(shard, 300 + i as u64).run_to_completion())
        .collect();
    let merged = crate::report::RunReport::combine(reports).unwrap();

    assert_eq!(merged.validate(), Ok(()));
    assert!(merged.progress.range_mismatches > 0);
    assert_eq!(merged.results.len(), 60);
}
