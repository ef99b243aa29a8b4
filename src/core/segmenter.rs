// src/core/segmenter.rs
use crate::core::registry::AvailabilitySet;

/// Punctuation stripped during normalization. Shared by the segmenter and
/// the validator so both see identical token streams.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '¡', '¿', '"', '\'', '(', ')', '[', ']', '…', '—',
];

/// The result of partitioning one sentence into lexical-item units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Units consumed, matched phrases and unrecognized tokens alike.
    /// Unmatched tokens still count toward length for bucketing.
    pub unit_count: usize,
    pub residual_unmatched: Vec<String>,
}

/// Case-folds, strips the fixed punctuation set, and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized whitespace-delimited tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    normalized.split(' ').map(str::to_string).collect()
}

/// Partitions `text` into lexical-item occurrences against `availability`.
///
/// Greedy longest-match, leftmost-first: at each cursor position the taught
/// phrases are tested as a prefix of the remaining tokens, longest phrase
/// first. A token no phrase covers is consumed as one unrecognized unit and
/// surfaced in `residual_unmatched` so the gate can reject the sentence.
///
/// Position-independent substring matching ("does the phrase occur anywhere,
/// remove the first occurrence") double-counts repeated vocabulary and is
/// deliberately not used here.
pub fn segment(text: &str, availability: &AvailabilitySet) -> Segmentation {
    let tokens = tokenize(text);
    let mut unit_count = 0;
    let mut residual_unmatched = Vec::new();

    let mut cursor = 0;
    while cursor < tokens.len() {
        let remaining = &tokens[cursor..];
        let matched_len = availability
            .phrases()
            .iter()
            .find(|phrase| {
                phrase.len() <= remaining.len()
                    && phrase.iter().zip(remaining.iter()).all(|(a, b)| a == b)
            })
            .map(|phrase| phrase.len());

        match matched_len {
            Some(len) => {
                cursor += len;
            }
            None => {
                residual_unmatched.push(tokens[cursor].clone());
                cursor += 1;
            }
        }
        unit_count += 1;
    }

    Segmentation {
        unit_count,
        residual_unmatched,
    }
}
