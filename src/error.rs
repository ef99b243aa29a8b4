// src/error.rs
use crate::core::types::CurriculumPosition;
use thiserror::Error;

/// Every failure the engine can surface. Candidate-level gate rejections are
/// not errors; they are recovered inside the basket builder's pull loop.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A query position could not be resolved against the registry.
    #[error("unknown curriculum position {0}")]
    UnknownPosition(CurriculumPosition),

    /// Two items were registered at the same curriculum position.
    #[error("duplicate curriculum position {0}")]
    DuplicatePosition(CurriculumPosition),

    /// The candidate stream ended, timed out, or the attempt budget was spent
    /// before the histogram was satisfied.
    #[error("candidate stream exhausted after {pulls} pulls with {filled}/{needed} slots filled")]
    Exhausted {
        pulls: usize,
        filled: usize,
        needed: usize,
    },

    /// The step's reference sentence itself fails the vocabulary gate.
    /// This is a curriculum-authoring defect, never bypassed.
    #[error("terminal sentence fails the vocabulary gate, violations: {violations:?}")]
    TerminalInvariant { violations: Vec<String> },

    /// The histogram configuration is inconsistent with the basket size.
    #[error("invalid histogram: {0}")]
    HistogramConfig(String),

    #[error("persistence I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence encoding failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}
