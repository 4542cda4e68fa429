//! Hidden-Markov-model localization over grid cells.
//!
//! - [`LocalizationEngine`]: forward (sum-product) belief filter
//! - [`ViterbiTrellis`]: parallel max-product recursion for MAP paths
//! - [`MotionModel`] / [`SensorModel`]: the transition and observation
//!   models both recursions share

mod engine;
mod motion;
mod sensor;
mod viterbi;

use thiserror::Error;

pub use engine::{LocalizationEngine, ReplaySummary, TickOutcome};
pub use motion::MotionModel;
pub use sensor::SensorModel;
pub use viterbi::ViterbiTrellis;

/// Normalizing sums below this are treated as numeric degeneracy.
pub(crate) const ALPHA_EPSILON: f64 = 1e-12;

/// Lifecycle of a localization engine.
///
/// `Uninitialized -> Tracking` on setup, `Tracking -> Finished` when the
/// round budget or the trace is exhausted; `reset` re-enters `Tracking`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No prior assigned yet
    Uninitialized,
    /// Belief is being updated each tick
    Tracking,
    /// Round complete; reset to start another
    Finished,
}

impl Phase {
    /// Phase name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "Uninitialized",
            Phase::Tracking => "Tracking",
            Phase::Finished => "Finished",
        }
    }
}

/// Errors raised by the localization engine.
#[derive(Error, Debug)]
pub enum LocalizationError {
    #[error("engine is {} and cannot tick; call setup/reset first", phase.name())]
    NotTracking { phase: Phase },

    #[error("grid changed under the engine (generation {expected} -> {actual}); reset required")]
    StaleGrid { expected: u64, actual: u64 },

    #[error("invalid localization config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Uninitialized.name(), "Uninitialized");
        assert_eq!(Phase::Tracking.name(), "Tracking");
        assert_eq!(Phase::Finished.name(), "Finished");
    }
}
