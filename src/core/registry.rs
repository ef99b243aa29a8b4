// src/core/registry.rs
use crate::core::segmenter;
use crate::core::types::{CurriculumPosition, ItemId, LexicalItem, SentencePair};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A frozen snapshot of the vocabulary legally usable at one curriculum
/// position. Carries both views at once: the phrase-level set for exact
/// multi-word matching and the word-level set for permissive validation.
/// Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySet {
    position: CurriculumPosition,
    /// Tokenized phrases, longest first (word count desc, then lexicographic)
    /// so the segmenter's scan is deterministic.
    phrases: Vec<Vec<String>>,
    phrase_set: HashSet<String>,
    words: HashSet<String>,
}

impl AvailabilitySet {
    /// Builds a snapshot directly from normalized-or-raw phrase strings.
    /// The registry uses this internally; tests and ad hoc callers can too.
    pub fn from_phrases<I, S>(position: CurriculumPosition, raw_phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<Vec<String>> = Vec::new();
        let mut phrase_set = HashSet::new();
        let mut words = HashSet::new();

        for raw in raw_phrases {
            let normalized = segmenter::normalize(raw.as_ref());
            if normalized.is_empty() {
                continue;
            }
            let tokens: Vec<String> = normalized.split(' ').map(str::to_string).collect();
            if phrase_set.insert(normalized) {
                for token in &tokens {
                    words.insert(token.clone());
                }
                phrases.push(tokens);
            }
        }

        // Longest-first ordering, ties broken lexicographically, so that the
        // greedy scan never depends on set iteration order.
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            position,
            phrases,
            phrase_set,
            words,
        }
    }

    pub fn position(&self) -> CurriculumPosition {
        self.position
    }

    /// Tokenized phrases in scan order (longest first).
    pub fn phrases(&self) -> &[Vec<String>] {
        &self.phrases
    }

    pub fn contains_phrase(&self, normalized_phrase: &str) -> bool {
        self.phrase_set.contains(normalized_phrase)
    }

    pub fn contains_word(&self, normalized_word: &str) -> bool {
        self.words.contains(normalized_word)
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// The ordered catalog of lexical items for one curriculum, plus each step's
/// reference terminal sentence. Treated as immutable shared state once the
/// curriculum is fixed; snapshot queries need no locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyRegistry {
    items: Vec<LexicalItem>,
    reference_sentences: HashMap<u32, SentencePair>,
}

impl VocabularyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an item, keeping the store sorted by curriculum position.
    /// Positions must be unique across the whole curriculum.
    pub fn register_item(&mut self, item: LexicalItem) -> Result<ItemId, EngineError> {
        match self
            .items
            .binary_search_by(|probe| probe.position.cmp(&item.position))
        {
            Ok(_) => Err(EngineError::DuplicatePosition(item.position)),
            Err(insert_at) => {
                self.items.insert(insert_at, item);
                Ok(insert_at)
            }
        }
    }

    /// Sets the reference sentence every step must end its last basket with.
    pub fn set_reference_sentence(&mut self, step: u32, pair: SentencePair) {
        self.reference_sentences.insert(step, pair);
    }

    pub fn items(&self) -> &[LexicalItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LexicalItem> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolves a position to its item id, or fails with `UnknownPosition`.
    /// A silent empty fallback here would mask authoring mistakes.
    pub fn resolve(&self, position: CurriculumPosition) -> Result<ItemId, EngineError> {
        self.items
            .binary_search_by(|probe| probe.position.cmp(&position))
            .map_err(|_| EngineError::UnknownPosition(position))
    }

    /// The cumulative vocabulary at `position`. With `include_self` the item
    /// at the position itself is part of the snapshot.
    ///
    /// Guarantee: for p1 < p2, the p1 snapshot is a subset of the p2 snapshot.
    pub fn available_up_to(
        &self,
        position: CurriculumPosition,
        include_self: bool,
    ) -> Result<AvailabilitySet, EngineError> {
        self.resolve(position)?;
        let phrases = self.items.iter().filter(|item| {
            if include_self {
                item.position <= position
            } else {
                item.position < position
            }
        });
        Ok(AvailabilitySet::from_phrases(
            position,
            phrases.map(|item| item.side_b.as_str()),
        ))
    }

    /// True if the item is the last one of its curriculum step.
    pub fn is_terminal(&self, id: ItemId) -> bool {
        match self.items.get(id) {
            Some(item) => !self.items[id + 1..]
                .iter()
                .any(|later| later.position.step == item.position.step),
            None => false,
        }
    }

    /// The reference sentence an item's basket must end with, present only
    /// for terminal items whose step has one authored.
    pub fn terminal_reference(&self, id: ItemId) -> Option<&SentencePair> {
        if !self.is_terminal(id) {
            return None;
        }
        let step = self.items.get(id)?.position.step;
        self.reference_sentences.get(&step)
    }
}
