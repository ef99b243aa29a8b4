//! Integration tests for the practice-sentence engine.
//!
//! These tests validate that the engine correctly:
//! - Walks a curriculum and grows availability monotonically
//! - Accepts, buckets, and orders candidates per the target histogram
//! - Discards untaught and duplicate candidates
//! - Fails hard on exhaustion instead of padding
//! - Pins the terminal reference sentence into the last slot
//! - Builds independent items concurrently without cross-corruption

use practice_core::core::builder::{BuildOptions, CandidateSource};
use practice_core::core::registry::VocabularyRegistry;
use practice_core::core::types::{
    Bucket, CurriculumPosition, Histogram, LexicalItem, SentencePair,
};
use practice_core::core::validator::{self, GatePolicy};
use practice_core::error::EngineError;
use practice_core::PracticeEngine;
use std::collections::HashSet;

fn pos(step: u32, item: u32) -> CurriculumPosition {
    CurriculumPosition::new(step, item)
}

fn pairs(texts: &[&str]) -> Vec<SentencePair> {
    texts.iter().map(|t| SentencePair::new("…", *t)).collect()
}

/// quiero / hablar / hoy, with a reference sentence closing step 0.
fn small_curriculum() -> VocabularyRegistry {
    let mut registry = VocabularyRegistry::new();
    registry
        .register_item(LexicalItem::new(pos(0, 0), "I want", "quiero"))
        .unwrap();
    registry
        .register_item(LexicalItem::new(pos(0, 1), "to speak", "hablar"))
        .unwrap();
    registry
        .register_item(LexicalItem::new(pos(0, 2), "today", "hoy"))
        .unwrap();
    registry.set_reference_sentence(0, SentencePair::new("to speak today", "hablar hoy"));
    registry
}

fn two_bucket_histogram() -> Histogram {
    Histogram::new(vec![Bucket::new(1, 1, 1, 1), Bucket::new(2, 2, 2, 1)], 2).unwrap()
}

#[test]
fn end_to_end_accepts_and_discards_per_availability() {
    let engine = PracticeEngine::new(
        small_curriculum(),
        two_bucket_histogram(),
        BuildOptions::default(),
    );

    // "mejor" was never taught; the builder discards it and keeps pulling.
    // Position 0.2 is terminal, so the reference sentence lands last.
    let mut source = pairs(&["quiero", "mejor", "quiero hoy"]).into_iter();
    let outcome = engine.build_basket(pos(0, 2), &mut source).unwrap();
    let basket = outcome.basket();
    assert!(outcome.is_complete());
    assert_eq!(basket.entries.len(), 2);
    assert_eq!(basket.entries[0].side_b, "quiero");
    assert_eq!(basket.entries[0].unit_count, 1);
    assert_eq!(basket.entries[1].side_b, "hablar hoy");
    assert_eq!(basket.entries[1].unit_count, 2);
}

#[test]
fn unknown_position_fails_before_any_pull() {
    let engine = PracticeEngine::new(
        small_curriculum(),
        two_bucket_histogram(),
        BuildOptions::default(),
    );
    let mut source = pairs(&["quiero"]).into_iter();
    let err = engine.build_basket(pos(9, 0), &mut source).unwrap_err();
    assert!(matches!(err, EngineError::UnknownPosition(_)));
}

#[test]
fn availability_is_monotone_along_the_walk() {
    let registry = small_curriculum();
    let walk = [pos(0, 0), pos(0, 1), pos(0, 2)];
    let mut previous: Option<HashSet<String>> = None;
    for position in walk {
        let availability = registry.available_up_to(position, true).unwrap();
        let current: HashSet<String> = availability
            .phrases()
            .iter()
            .map(|tokens| tokens.join(" "))
            .collect();
        if let Some(earlier) = &previous {
            assert!(earlier.is_subset(&current), "availability shrank at {position}");
        }
        previous = Some(current);
    }
}

#[test]
fn committed_basket_satisfies_the_histogram_exactly() {
    let histogram = Histogram::new(
        vec![Bucket::new(1, 1, 1, 2), Bucket::new(2, 2, 3, 2)],
        4,
    )
    .unwrap();
    let engine = PracticeEngine::new(small_curriculum(), histogram, BuildOptions::default());
    let mut source = pairs(&[
        "quiero",
        "quiero hablar hoy",
        "hoy",
        "quiero hoy",
        "hablar",
    ])
    .into_iter();

    let outcome = engine.build_basket(pos(0, 2), &mut source).unwrap();
    let basket = outcome.basket();
    assert_eq!(basket.entries.len(), 4);
    for bucket in engine.histogram().buckets() {
        let in_bucket = basket
            .entries
            .iter()
            .filter(|e| bucket.min_units <= e.unit_count && e.unit_count <= bucket.max_units)
            .count();
        assert_eq!(in_bucket, bucket.required, "bucket {} off target", bucket.id);
    }

    let texts: HashSet<_> = basket.entries.iter().map(|e| e.side_b.as_str()).collect();
    assert_eq!(texts.len(), basket.entries.len(), "duplicate side_b text");
}

#[test]
fn exhaustion_never_pads_the_basket() {
    let engine = PracticeEngine::new(
        small_curriculum(),
        two_bucket_histogram(),
        BuildOptions::default(),
    );
    let mut source = pairs(&["quiero"]).into_iter();

    let err = engine.build_basket(pos(0, 0), &mut source).unwrap_err();
    match err {
        EngineError::Exhausted { filled, needed, .. } => {
            assert_eq!(filled, 1);
            assert_eq!(needed, 2);
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

#[test]
fn terminal_item_ends_with_the_reference_sentence() {
    let engine = PracticeEngine::new(
        small_curriculum(),
        two_bucket_histogram(),
        BuildOptions::default(),
    );
    let mut source = pairs(&["hoy", "quiero hablar"]).into_iter();

    let outcome = engine.build_basket(pos(0, 2), &mut source).unwrap();
    let last = outcome.basket().entries.last().unwrap().clone();
    assert_eq!(last.side_a, "to speak today");
    assert_eq!(last.side_b, "hablar hoy");

    // The pinned sentence must itself pass the gate it was built under.
    let availability = engine.availability_for(pos(0, 2)).unwrap();
    let verdict = validator::validate(&last.side_b, &availability, GatePolicy::WordPermissive);
    assert!(verdict.ok);
}

#[test]
fn unresolvable_terminal_reference_fails_the_build() {
    let mut registry = small_curriculum();
    registry.set_reference_sentence(0, SentencePair::new("…", "hablar mañana"));
    let engine = PracticeEngine::new(registry, two_bucket_histogram(), BuildOptions::default());
    let mut source = pairs(&["hoy", "quiero hablar"]).into_iter();

    let err = engine.build_basket(pos(0, 2), &mut source).unwrap_err();
    match err {
        EngineError::TerminalInvariant { violations } => {
            assert_eq!(violations, vec!["mañana".to_string()]);
        }
        other => panic!("expected TerminalInvariant, got {other:?}"),
    }
}

#[test]
fn batch_build_isolates_failures_per_item() {
    let engine = PracticeEngine::new(
        small_curriculum(),
        two_bucket_histogram(),
        BuildOptions::default(),
    );

    // Item 0.1 gets a stream that cannot fill bucket 2; the others succeed.
    let report = engine.build_all(|item, _availability| {
        let texts: Vec<SentencePair> = match (item.position.step, item.position.item) {
            (0, 0) => pairs(&["quiero", "quiero quiero"]),
            (0, 1) => pairs(&["hablar"]),
            _ => pairs(&["hoy", "quiero hablar"]),
        };
        Box::new(texts.into_iter()) as Box<dyn CandidateSource + Send>
    });

    assert_eq!(report.outcomes.len(), 3);
    let failed: Vec<_> = report.failures().map(|(p, _)| p).collect();
    assert_eq!(failed, vec![pos(0, 1)]);
    let completed: Vec<_> = report.completed().map(|(p, _)| p).collect();
    assert_eq!(completed, vec![pos(0, 0), pos(0, 2)]);
    assert!(!report.all_complete());
}

#[test]
fn batch_results_come_back_in_curriculum_order() {
    let engine = PracticeEngine::new(
        small_curriculum(),
        two_bucket_histogram(),
        BuildOptions::default(),
    );
    let report = engine.build_all(|item, _availability| {
        let texts = match (item.position.step, item.position.item) {
            (0, 0) => pairs(&["quiero", "quiero quiero"]),
            (0, 1) => pairs(&["hablar", "quiero hablar"]),
            _ => pairs(&["hoy", "quiero hablar"]),
        };
        Box::new(texts.into_iter()) as Box<dyn CandidateSource + Send>
    });

    let positions: Vec<_> = report.outcomes.iter().map(|(p, _)| *p).collect();
    assert_eq!(positions, vec![pos(0, 0), pos(0, 1), pos(0, 2)]);
    assert!(report.all_complete());
}
