// src/core/builder.rs
use crate::core::registry::AvailabilitySet;
use crate::core::segmenter;
use crate::core::types::{Basket, BasketEntry, CurriculumPosition, Histogram, SentencePair};
use crate::core::validator::{self, GatePolicy};
use crate::error::EngineError;
use log::{debug, warn};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// An external supplier of candidate sentence pairs: a curated table, a
/// template expander, a remote model. The engine only pulls the next pair
/// until the supplier signals exhaustion with `None`.
pub trait CandidateSource {
    fn next_candidate(&mut self) -> Option<SentencePair>;
}

/// Any iterator of sentence pairs works as a source.
impl<I> CandidateSource for I
where
    I: Iterator<Item = SentencePair>,
{
    fn next_candidate(&mut self) -> Option<SentencePair> {
        self.next()
    }
}

/// Knobs for one basket build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub policy: GatePolicy,
    /// Hard cap on pulls from the candidate source.
    pub max_attempts: usize,
    /// A single pull blocking longer than this counts as exhaustion; the
    /// source may be backed by a remote generation service.
    pub pull_timeout: Duration,
    /// Opt-in best effort: exhaustion yields an explicitly partial basket
    /// instead of a hard failure. Never the default.
    pub allow_partial: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            policy: GatePolicy::WordPermissive,
            max_attempts: 1000,
            pull_timeout: Duration::from_secs(5),
            allow_partial: false,
        }
    }
}

/// A committed build result. `Partial` only occurs when the caller opted in
/// via `BuildOptions::allow_partial`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Complete(Basket),
    Partial(Basket),
}

impl BuildOutcome {
    pub fn basket(&self) -> &Basket {
        match self {
            BuildOutcome::Complete(b) | BuildOutcome::Partial(b) => b,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, BuildOutcome::Complete(_))
    }
}

/// Builds one basket: pulls candidates, gates them, deduplicates, buckets by
/// unit count, and stops the moment the target histogram is satisfied.
///
/// The only mutable state lives inside one `build` call; the builder itself
/// can be shared across threads.
pub struct BasketBuilder<'a> {
    availability: &'a AvailabilitySet,
    histogram: &'a Histogram,
    options: BuildOptions,
}

impl<'a> BasketBuilder<'a> {
    pub fn new(
        availability: &'a AvailabilitySet,
        histogram: &'a Histogram,
        options: BuildOptions,
    ) -> Self {
        Self {
            availability,
            histogram,
            options,
        }
    }

    /// Pulls from `source` until the histogram is satisfied or the stream is
    /// exhausted. When `terminal` is given, the last slot of the highest
    /// bucket is overwritten with it after satisfaction.
    ///
    /// Gate rejections and duplicates are recovered locally by discarding
    /// and pulling again; everything else surfaces as a typed error. A
    /// basket is never padded to reach the configured size.
    pub fn build(
        &self,
        position: CurriculumPosition,
        source: &mut dyn CandidateSource,
        terminal: Option<&SentencePair>,
    ) -> Result<BuildOutcome, EngineError> {
        // A reference sentence that fails the gate is an authoring defect;
        // detect it before spending any pulls.
        if let Some(pair) = terminal {
            let verdict = validator::validate(&pair.side_b, self.availability, self.options.policy);
            if !verdict.ok {
                return Err(EngineError::TerminalInvariant {
                    violations: verdict.violations,
                });
            }
        }

        let buckets = self.histogram.buckets();
        let mut slots: Vec<Vec<BasketEntry>> = vec![Vec::new(); buckets.len()];
        let mut seen: HashSet<String> = HashSet::new();
        // Reserving the terminal text up front keeps the no-duplicate
        // invariant intact across the later overwrite.
        if let Some(pair) = terminal {
            seen.insert(pair.side_b.clone());
        }

        let mut pulls = 0;
        while !self.satisfied(&slots) {
            if pulls >= self.options.max_attempts {
                debug!("basket {}: attempt budget of {} spent", position, pulls);
                break;
            }
            let pull_started = Instant::now();
            let pair = match source.next_candidate() {
                Some(pair) => pair,
                None => break,
            };
            pulls += 1;
            if pull_started.elapsed() > self.options.pull_timeout {
                warn!(
                    "basket {}: candidate pull exceeded {:?}, treating source as exhausted",
                    position, self.options.pull_timeout
                );
                break;
            }

            let verdict = validator::validate(&pair.side_b, self.availability, self.options.policy);
            if !verdict.ok {
                debug!(
                    "basket {}: gate rejected {:?} (violations: {:?})",
                    position, pair.side_b, verdict.violations
                );
                continue;
            }
            if seen.contains(&pair.side_b) {
                debug!("basket {}: duplicate discarded {:?}", position, pair.side_b);
                continue;
            }
            let segmentation = segmenter::segment(&pair.side_b, self.availability);
            let bucket_index = match self.histogram.bucket_index_for(segmentation.unit_count) {
                Some(index) => index,
                None => {
                    debug!(
                        "basket {}: {:?} has {} units, outside every bucket",
                        position, pair.side_b, segmentation.unit_count
                    );
                    continue;
                }
            };
            if slots[bucket_index].len() >= buckets[bucket_index].required {
                debug!(
                    "basket {}: bucket {} already full, discarded {:?}",
                    position, buckets[bucket_index].id, pair.side_b
                );
                continue;
            }

            seen.insert(pair.side_b.clone());
            slots[bucket_index].push(BasketEntry {
                side_a: pair.side_a,
                side_b: pair.side_b,
                bucket_id: buckets[bucket_index].id,
                unit_count: segmentation.unit_count,
            });
        }

        if !self.satisfied(&slots) {
            let filled = slots.iter().map(Vec::len).sum();
            let needed = self.histogram.basket_size();
            if self.options.allow_partial {
                debug!(
                    "basket {}: partial commit with {}/{} slots after {} pulls",
                    position, filled, needed, pulls
                );
                return Ok(BuildOutcome::Partial(Self::flatten(position, slots)));
            }
            return Err(EngineError::Exhausted {
                pulls,
                filled,
                needed,
            });
        }

        if let Some(pair) = terminal {
            let segmentation = segmenter::segment(&pair.side_b, self.availability);
            let last_bucket = buckets.len() - 1;
            let slot = slots[last_bucket]
                .last_mut()
                .expect("satisfied histogram has a filled last bucket");
            *slot = BasketEntry {
                side_a: pair.side_a.clone(),
                side_b: pair.side_b.clone(),
                bucket_id: buckets[last_bucket].id,
                unit_count: segmentation.unit_count,
            };
        }

        Ok(BuildOutcome::Complete(Self::flatten(position, slots)))
    }

    fn satisfied(&self, slots: &[Vec<BasketEntry>]) -> bool {
        self.histogram
            .buckets()
            .iter()
            .zip(slots)
            .all(|(bucket, filled)| filled.len() == bucket.required)
    }

    /// Ascending bucket order, insertion order within each bucket.
    fn flatten(position: CurriculumPosition, slots: Vec<Vec<BasketEntry>>) -> Basket {
        Basket {
            position,
            entries: slots.into_iter().flatten().collect(),
        }
    }
}
