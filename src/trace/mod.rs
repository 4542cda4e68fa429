//! Recorded command/reading traces for reproducible localization runs.
//!
//! A trace is a starting coordinate plus a fixed-length sequence of
//! `(movement command, terrain reading)` pairs. Traces are generated
//! against a grid (simulating the true agent) or loaded from the
//! line-oriented text format, and consumed one step per tick by the
//! localization engine's replay mode.

mod format;
mod generator;

use thiserror::Error;

use crate::core::{CellCoord, MoveCommand, TerrainReading};

pub use generator::{GroundTruth, TraceGenerator};

/// One tick of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceStep {
    /// Command issued this tick
    pub command: MoveCommand,
    /// Terrain reading sensed after the move
    pub reading: TerrainReading,
}

/// A fixed-length recorded run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    start: CellCoord,
    steps: Vec<TraceStep>,
}

impl Trace {
    /// Build a trace from its parts.
    pub fn new(start: CellCoord, steps: Vec<TraceStep>) -> Self {
        Self { start, steps }
    }

    /// True starting coordinate of the recorded run.
    #[inline]
    pub fn start(&self) -> CellCoord {
        self.start
    }

    /// The per-tick steps.
    #[inline]
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Number of ticks recorded.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Is the trace empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Serialize to the line-oriented text form.
    pub fn serialize(&self) -> String {
        format::serialize(self)
    }

    /// Parse the line-oriented text form; `rounds` fixes the expected
    /// length, which the format does not self-describe.
    pub fn deserialize(text: &str, rounds: usize) -> Result<Self, TraceError> {
        format::deserialize(text, rounds)
    }

    /// Load a trace file.
    pub fn load(path: &std::path::Path, rounds: usize) -> Result<Self, TraceError> {
        let text = std::fs::read_to_string(path)?;
        Self::deserialize(&text, rounds)
    }

    /// Write the trace to a file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), TraceError> {
        std::fs::write(path, self.serialize())?;
        Ok(())
    }
}

/// Errors raised while parsing or generating traces.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("unexpected token {found:?} on line {line}")]
    Malformed { line: usize, found: String },

    #[error("trace too short: expected {expected} lines, found {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("unexpected trailing content on line {line}")]
    TrailingContent { line: usize },

    #[error("grid has no walkable cells to start from")]
    NoWalkableCells,

    #[error("trace file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// File name for a run's trace, from a caller-owned run identifier.
pub fn run_file_name(run_id: u32) -> String {
    format!("trace_run_{:03}.txt", run_id)
}

/// Mean Euclidean distance between true and estimated cells per tick,
/// in cell units. Sequences are compared tick-by-tick.
pub fn average_error(truth: &[CellCoord], estimated: &[CellCoord]) -> f64 {
    if truth.is_empty() || estimated.is_empty() {
        return 0.0;
    }
    let n = truth.len().min(estimated.len());
    let total: f64 = truth[..n]
        .iter()
        .zip(&estimated[..n])
        .map(|(t, e)| t.euclidean_distance(e))
        .sum();
    total / n as f64
}
