use practice_core::core::builder::{BuildOptions, CandidateSource};
use practice_core::core::registry::VocabularyRegistry;
use practice_core::core::types::{
    Bucket, CurriculumPosition, Histogram, LexicalItem, SentencePair,
};
use practice_core::persistence::{self, BasketStore};
use practice_core::PracticeEngine;
use std::collections::HashMap;
use std::path::Path;

const STORE_PATH: &str = "target/baskets.bin";
const EXPORT_PATH: &str = "target/baskets.json";

fn main() {
    env_logger::init();

    let registry = demo_curriculum();
    let histogram = Histogram::new(
        vec![Bucket::new(1, 1, 2, 2), Bucket::new(2, 3, 5, 1)],
        3,
    )
    .expect("demo histogram is well-formed");
    let engine = PracticeEngine::new(registry, histogram, BuildOptions::default());

    let table = demo_candidate_table();
    println!("Curriculum Practice Engine demo");
    println!("---------------------------------------------------------------");

    let report = engine.build_all(|item, _availability| {
        let candidates = table.get(&item.position).cloned().unwrap_or_default();
        Box::new(candidates.into_iter()) as Box<dyn CandidateSource + Send>
    });

    let mut store = BasketStore::new();
    for (position, outcome) in report.completed() {
        let item = &engine.registry().items()[engine.registry().resolve(position).unwrap()];
        println!("\n[{}] {} / {}", position, item.side_a, item.side_b);
        for entry in &outcome.basket().entries {
            println!(
                "  bucket {} ({} units): {}  |  {}",
                entry.bucket_id, entry.unit_count, entry.side_b, entry.side_a
            );
        }
        store.insert(outcome.basket().clone());
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("\nFailed items:");
        for (position, err) in failures {
            println!("  {} -> {}", position, err);
        }
    }

    println!("\nSaving {} baskets...", store.len());
    if let Err(e) = persistence::save_to_disk(&store, Path::new(STORE_PATH)) {
        eprintln!("[ERROR] Could not save basket store: {}", e);
    } else if let Err(e) = persistence::export_json(&store, Path::new(EXPORT_PATH)) {
        eprintln!("[ERROR] Could not export JSON: {}", e);
    } else {
        println!("Store saved to '{}', JSON export at '{}'", STORE_PATH, EXPORT_PATH);
    }
}

/// Two steps of a tiny Spanish curriculum, each with a reference sentence,
/// plus a third step whose candidate table is deliberately too thin so the
/// failure path shows up in the report.
fn demo_curriculum() -> VocabularyRegistry {
    let mut registry = VocabularyRegistry::new();
    let items = [
        (0, 0, "I want", "quiero"),
        (0, 1, "to speak", "hablar"),
        (0, 2, "Spanish", "español"),
        (1, 0, "today", "hoy"),
        (1, 1, "with", "con"),
        (1, 2, "my friend", "mi amigo"),
        (2, 0, "thanks", "gracias"),
    ];
    for (step, index, side_a, side_b) in items {
        registry
            .register_item(LexicalItem::new(
                CurriculumPosition::new(step, index),
                side_a,
                side_b,
            ))
            .expect("demo positions are unique");
    }
    registry.set_reference_sentence(
        0,
        SentencePair::new("I want to speak Spanish.", "Quiero hablar español."),
    );
    registry.set_reference_sentence(
        1,
        SentencePair::new(
            "I want to speak with my friend today.",
            "Quiero hablar con mi amigo hoy.",
        ),
    );
    registry
}

fn demo_candidate_table() -> HashMap<CurriculumPosition, Vec<SentencePair>> {
    let mut table = HashMap::new();
    let rows: [(u32, u32, &[(&str, &str)]); 7] = [
        (0, 0, &[
            ("I want.", "Quiero."),
            ("I want, I want!", "¡Quiero, quiero!"),
            ("I want, I want, I want.", "Quiero, quiero, quiero."),
        ]),
        (0, 1, &[
            ("To speak.", "Hablar."),
            ("I want to speak.", "Quiero hablar."),
            ("I want, I want to speak.", "Quiero, quiero hablar."),
        ]),
        (0, 2, &[
            ("Spanish.", "Español."),
            ("To speak Spanish.", "Hablar español."),
            ("To speak, to speak Spanish.", "Hablar, hablar español."),
        ]),
        (1, 0, &[
            ("Today.", "Hoy."),
            ("To speak today.", "Hablar hoy."),
            ("I want to speak today.", "Quiero hablar hoy."),
        ]),
        (1, 1, &[
            ("Today.", "Hoy."),
            ("I want to speak.", "Quiero hablar."),
            ("I want to speak today.", "Quiero hablar hoy."),
        ]),
        (1, 2, &[
            ("My friend.", "Mi amigo."),
            ("My friend today.", "Mi amigo hoy."),
            ("To speak with my friend.", "Hablar con mi amigo."),
        ]),
        // Too few usable candidates on purpose.
        (2, 0, &[
            ("Better.", "Mejor."),
            ("Thanks.", "Gracias."),
        ]),
    ];
    for (step, index, pairs) in rows {
        table.insert(
            CurriculumPosition::new(step, index),
            pairs
                .iter()
                .map(|(a, b)| SentencePair::new(*a, *b))
                .collect(),
        );
    }
    table
}
