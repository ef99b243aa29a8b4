// src/core/types.rs
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a registered lexical item.
/// It is the item's index in the registry's store.
pub type ItemId = usize;

/// A total-order key establishing teaching order across the curriculum.
/// Comparison is lexicographic on `(step, item)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurriculumPosition {
    pub step: u32,
    pub item: u32,
}

impl CurriculumPosition {
    pub fn new(step: u32, item: u32) -> Self {
        Self { step, item }
    }
}

impl fmt::Display for CurriculumPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.step, self.item)
    }
}

/// A parallel-language sentence pair. `side_b` is the side the engine
/// segments and validates; `side_a` is carried through opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    pub side_a: String,
    pub side_b: String,
}

impl SentencePair {
    pub fn new(side_a: impl Into<String>, side_b: impl Into<String>) -> Self {
        Self {
            side_a: side_a.into(),
            side_b: side_b.into(),
        }
    }
}

/// One teaching unit of vocabulary. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalItem {
    pub position: CurriculumPosition,
    pub side_a: String,
    pub side_b: String,
}

impl LexicalItem {
    pub fn new(
        position: CurriculumPosition,
        side_a: impl Into<String>,
        side_b: impl Into<String>,
    ) -> Self {
        Self {
            position,
            side_a: side_a.into(),
            side_b: side_b.into(),
        }
    }

    /// A multi-token item teaches a phrase rather than a single word.
    pub fn is_multi_token(&self) -> bool {
        self.side_b.trim().contains(char::is_whitespace)
    }
}

/// One complexity tier of the target distribution: candidates whose unit
/// count falls in `min_units..=max_units` fill this bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub id: u32,
    pub min_units: usize,
    pub max_units: usize,
    pub required: usize,
}

impl Bucket {
    pub fn new(id: u32, min_units: usize, max_units: usize, required: usize) -> Self {
        Self {
            id,
            min_units,
            max_units,
            required,
        }
    }
}

/// The target distribution of sentence complexity for one basket.
/// Validated at construction; `required` counts must sum to the basket size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    buckets: Vec<Bucket>,
    basket_size: usize,
}

impl Histogram {
    /// Builds a histogram, rejecting inverted ranges, overlapping buckets,
    /// and required counts that do not sum to `basket_size`.
    pub fn new(buckets: Vec<Bucket>, basket_size: usize) -> Result<Self, EngineError> {
        if buckets.is_empty() {
            return Err(EngineError::HistogramConfig(
                "histogram must have at least one bucket".to_string(),
            ));
        }
        for bucket in &buckets {
            if bucket.min_units > bucket.max_units {
                return Err(EngineError::HistogramConfig(format!(
                    "bucket {} has inverted range {}..={}",
                    bucket.id, bucket.min_units, bucket.max_units
                )));
            }
            if bucket.required == 0 {
                return Err(EngineError::HistogramConfig(format!(
                    "bucket {} requires zero items",
                    bucket.id
                )));
            }
        }
        for pair in buckets.windows(2) {
            if pair[1].min_units <= pair[0].max_units {
                return Err(EngineError::HistogramConfig(format!(
                    "buckets {} and {} overlap or are out of order",
                    pair[0].id, pair[1].id
                )));
            }
        }
        let total: usize = buckets.iter().map(|b| b.required).sum();
        if total != basket_size {
            return Err(EngineError::HistogramConfig(format!(
                "bucket counts sum to {} but basket size is {}",
                total, basket_size
            )));
        }
        Ok(Self {
            buckets,
            basket_size,
        })
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn basket_size(&self) -> usize {
        self.basket_size
    }

    /// Index of the bucket whose range contains `unit_count`, if any.
    pub fn bucket_index_for(&self, unit_count: usize) -> Option<usize> {
        self.buckets
            .iter()
            .position(|b| b.min_units <= unit_count && unit_count <= b.max_units)
    }
}

/// One committed practice sentence. Field order is part of the persisted
/// record layout and must not be reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    pub side_a: String,
    pub side_b: String,
    pub bucket_id: u32,
    pub unit_count: usize,
}

/// The committed, ordered, histogram-satisfying set of practice sentences
/// for one lexical item. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub position: CurriculumPosition,
    pub entries: Vec<BasketEntry>,
}

impl Basket {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_ordering_is_lexicographic() {
        let a = CurriculumPosition::new(1, 9);
        let b = CurriculumPosition::new(2, 0);
        assert!(a < b);
        assert!(CurriculumPosition::new(2, 0) < CurriculumPosition::new(2, 1));
    }

    #[test]
    fn multi_token_detection() {
        let single = LexicalItem::new(CurriculumPosition::new(0, 0), "I want", "quiero");
        let multi = LexicalItem::new(CurriculumPosition::new(0, 1), "good morning", "buenos dias");
        assert!(!single.is_multi_token());
        assert!(multi.is_multi_token());
    }

    #[test]
    fn histogram_rejects_count_mismatch() {
        let buckets = vec![Bucket::new(1, 1, 2, 3), Bucket::new(2, 3, 5, 3)];
        let err = Histogram::new(buckets, 10).unwrap_err();
        assert!(matches!(err, EngineError::HistogramConfig(_)));
    }

    #[test]
    fn histogram_rejects_overlapping_buckets() {
        let buckets = vec![Bucket::new(1, 1, 3, 1), Bucket::new(2, 3, 5, 1)];
        assert!(Histogram::new(buckets, 2).is_err());
    }

    #[test]
    fn histogram_rejects_inverted_range() {
        let buckets = vec![Bucket::new(1, 4, 2, 2)];
        assert!(Histogram::new(buckets, 2).is_err());
    }

    #[test]
    fn histogram_maps_counts_to_buckets() {
        let buckets = vec![Bucket::new(1, 1, 2, 5), Bucket::new(2, 3, 5, 5)];
        let histogram = Histogram::new(buckets, 10).unwrap();
        assert_eq!(histogram.bucket_index_for(1), Some(0));
        assert_eq!(histogram.bucket_index_for(4), Some(1));
        assert_eq!(histogram.bucket_index_for(6), None);
        assert_eq!(histogram.bucket_index_for(0), None);
    }
}
