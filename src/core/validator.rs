// src/core/validator.rs
use crate::core::registry::AvailabilitySet;
use crate::core::segmenter;
use serde::{Deserialize, Serialize};

/// How strictly the gate interprets "available vocabulary".
///
/// Curricula disagree on whether a multi-word item also licenses its
/// component words; the policy is configured, not guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePolicy {
    /// Every maximal phrase match must come from the taught phrase set; any
    /// token the segmenter cannot cover is a violation.
    PhraseStrict,
    /// Every individual word must appear somewhere in a taught phrase.
    WordPermissive,
}

/// The gate's verdict for one sentence. All violations are reported, not
/// just the first, so callers can decide what partial credit means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub ok: bool,
    pub violations: Vec<String>,
}

impl Verdict {
    fn from_violations(violations: Vec<String>) -> Self {
        Self {
            ok: violations.is_empty(),
            violations,
        }
    }
}

/// Checks that `text` uses only vocabulary in `availability`. Pure function:
/// identical inputs always produce the same verdict.
pub fn validate(text: &str, availability: &AvailabilitySet, policy: GatePolicy) -> Verdict {
    let violations = match policy {
        GatePolicy::PhraseStrict => segmenter::segment(text, availability).residual_unmatched,
        GatePolicy::WordPermissive => segmenter::tokenize(text)
            .into_iter()
            .filter(|word| !availability.contains_word(word))
            .collect(),
    };
    Verdict::from_violations(violations)
}
