// src/core/engine.rs
use crate::core::builder::{BasketBuilder, BuildOptions, BuildOutcome, CandidateSource};
use crate::core::registry::{AvailabilitySet, VocabularyRegistry};
use crate::core::types::{CurriculumPosition, Histogram, LexicalItem};
use crate::error::EngineError;
use log::{info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

/// The per-item results of a whole-curriculum run. A failed item never
/// blocks or corrupts the others; callers read failures from here.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<(CurriculumPosition, Result<BuildOutcome, EngineError>)>,
}

impl BatchReport {
    pub fn completed(&self) -> impl Iterator<Item = (CurriculumPosition, &BuildOutcome)> {
        self.outcomes
            .iter()
            .filter_map(|(pos, res)| res.as_ref().ok().map(|o| (*pos, o)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (CurriculumPosition, &EngineError)> {
        self.outcomes
            .iter()
            .filter_map(|(pos, res)| res.as_ref().err().map(|e| (*pos, e)))
    }

    pub fn all_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, res)| matches!(res, Ok(outcome) if outcome.is_complete()))
    }
}

/// The orchestrator: owns the fixed curriculum, the target histogram, and
/// the build options, and drives basket construction per item or for the
/// whole curriculum at once.
pub struct PracticeEngine {
    registry: VocabularyRegistry,
    histogram: Histogram,
    options: BuildOptions,
}

impl PracticeEngine {
    pub fn new(registry: VocabularyRegistry, histogram: Histogram, options: BuildOptions) -> Self {
        Self {
            registry,
            histogram,
            options,
        }
    }

    pub fn registry(&self) -> &VocabularyRegistry {
        &self.registry
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// The frozen vocabulary snapshot an item's candidates are measured
    /// against. The item's own vocabulary is included.
    pub fn availability_for(
        &self,
        position: CurriculumPosition,
    ) -> Result<AvailabilitySet, EngineError> {
        self.registry.available_up_to(position, true)
    }

    /// Builds the basket for the item at `position`, pulling candidates from
    /// `source`. Terminal items get their step's reference sentence as the
    /// final entry.
    pub fn build_basket(
        &self,
        position: CurriculumPosition,
        source: &mut dyn CandidateSource,
    ) -> Result<BuildOutcome, EngineError> {
        let id = self.registry.resolve(position)?;
        let availability = self.registry.available_up_to(position, true)?;
        let terminal = self.registry.terminal_reference(id);
        let builder = BasketBuilder::new(&availability, &self.histogram, self.options.clone());
        builder.build(position, source, terminal)
    }

    /// Builds every item's basket, running independent items concurrently.
    ///
    /// `make_source` is called once per item with the item and its frozen
    /// availability snapshot and must hand back that item's candidate
    /// stream. The registry is shared read-only across workers; each build's
    /// mutable state is local to its worker.
    pub fn build_all<F>(&self, make_source: F) -> BatchReport
    where
        F: Fn(&LexicalItem, &AvailabilitySet) -> Box<dyn CandidateSource + Send> + Sync,
    {
        let items = self.registry.items();
        let worker_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(items.len().max(1));

        let cursor = AtomicUsize::new(0);
        let results: Mutex<Vec<(CurriculumPosition, Result<BuildOutcome, EngineError>)>> =
            Mutex::new(Vec::with_capacity(items.len()));

        thread::scope(|scope| {
            for _ in 0..worker_count {
                scope.spawn(|| loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    if index >= items.len() {
                        break;
                    }
                    let item = &items[index];
                    let result = self.build_one(item, &make_source);
                    if let Err(err) = &result {
                        warn!("basket {} failed: {}", item.position, err);
                    }
                    results
                        .lock()
                        .expect("batch result collection poisoned")
                        .push((item.position, result));
                });
            }
        });

        let mut outcomes = results
            .into_inner()
            .expect("batch result collection poisoned");
        outcomes.sort_by_key(|(position, _)| *position);
        let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            "batch build finished: {} baskets, {} failures",
            outcomes.len() - failed,
            failed
        );
        BatchReport { outcomes }
    }

    fn build_one<F>(&self, item: &LexicalItem, make_source: &F) -> Result<BuildOutcome, EngineError>
    where
        F: Fn(&LexicalItem, &AvailabilitySet) -> Box<dyn CandidateSource + Send>,
    {
        let id = self.registry.resolve(item.position)?;
        let availability = self.registry.available_up_to(item.position, true)?;
        let terminal = self.registry.terminal_reference(id);
        let mut source = make_source(item, &availability);
        let builder = BasketBuilder::new(&availability, &self.histogram, self.options.clone());
        builder.build(item.position, source.as_mut(), terminal)
    }
}
