//! Belief tracking engine: forward filter plus optional Viterbi decoding.

use log::{debug, trace, warn};

use crate::config::LocalizationConfig;
use crate::core::{CellCoord, MoveCommand, TerrainReading};
use crate::grid::GridModel;
use crate::trace::Trace;
use crate::viz::{NullSink, VizSink};

use super::motion::MotionModel;
use super::sensor::SensorModel;
use super::viterbi::ViterbiTrellis;
use super::{LocalizationError, Phase, ALPHA_EPSILON};

/// Outcome of one belief update.
#[derive(Clone, Debug)]
pub struct TickOutcome {
    /// MAP cell recorded for this tick
    pub map_cell: CellCoord,
    /// Highest-belief cell after the update
    pub belief_peak: CellCoord,
    /// Belief probability at the peak
    pub peak_probability: f64,
    /// The normalizing sum collapsed; the previous belief was retained
    pub degenerate: bool,
    /// Ticks elapsed since setup/reset
    pub ticks: usize,
    /// Did this tick exhaust the round budget?
    pub finished: bool,
}

/// Summary of a completed trace replay.
#[derive(Clone, Debug)]
pub struct ReplaySummary {
    /// Ticks consumed from the trace
    pub ticks: usize,
    /// MAP trajectory, one cell per tick
    pub map_path: Vec<CellCoord>,
    /// Ticks on which the filter or trellis degenerated
    pub degenerate_ticks: usize,
}

/// Bayesian belief tracker over grid cells.
///
/// Holds a normalized probability distribution over walkable cells,
/// advanced one `(command, reading)` pair per tick, with a parallel
/// Viterbi trellis for MAP trajectory recovery.
///
/// Every tick reads only the previous tick's snapshot and writes a fresh
/// buffer, swapped in at the end of the pass.
#[derive(Clone, Debug)]
pub struct LocalizationEngine {
    config: LocalizationConfig,
    motion: MotionModel,
    sensor: SensorModel,
    phase: Phase,

    /// Normalized belief, parallel to the grid
    belief: Vec<f64>,
    /// Next-tick buffer
    scratch: Vec<f64>,
    /// Per-engine pruned flags
    pruned: Vec<bool>,
    /// Consecutive below-threshold ticks per cell
    low_streak: Vec<u32>,

    trellis: ViterbiTrellis,

    /// Grid generation the current round was set up against
    grid_generation: u64,
    ticks: usize,
}

impl LocalizationEngine {
    /// Create an engine; call [`setup`](Self::setup) before ticking.
    pub fn new(config: LocalizationConfig) -> Result<Self, LocalizationError> {
        config
            .validate()
            .map_err(|e| LocalizationError::InvalidConfig(e.to_string()))?;
        let motion = MotionModel::new(config.success_rate);
        let sensor = SensorModel::new(config.sensor_success);
        Ok(Self {
            config,
            motion,
            sensor,
            phase: Phase::Uninitialized,
            belief: Vec::new(),
            scratch: Vec::new(),
            pruned: Vec::new(),
            low_streak: Vec::new(),
            trellis: ViterbiTrellis::new(0),
            grid_generation: 0,
            ticks: 0,
        })
    }

    /// Assign the uniform prior and enter `Tracking`.
    ///
    /// Every walkable cell receives `1 / walkable_count`; blocked cells
    /// receive 0. Records the grid generation so later terrain edits are
    /// detected as staleness.
    pub fn setup(&mut self, grid: &GridModel) {
        let n = grid.cell_count();
        let prior = 1.0 / grid.walkable_count().max(1) as f64;

        self.belief = (0..n)
            .map(|i| {
                if grid.is_walkable(grid.coord_of(i)) {
                    prior
                } else {
                    0.0
                }
            })
            .collect();
        self.scratch = vec![0.0; n];
        self.pruned = vec![false; n];
        self.low_streak = vec![0; n];
        self.trellis = ViterbiTrellis::new(n);
        self.trellis.reset_uniform(grid);

        self.grid_generation = grid.generation();
        self.ticks = 0;
        self.phase = Phase::Tracking;
        debug!(
            "[Localize] setup: {} cells, {} walkable, prior {:.6}",
            n,
            grid.walkable_count(),
            prior
        );
    }

    /// Re-enter `Tracking` for a new round; identical to a fresh setup.
    pub fn reset(&mut self, grid: &GridModel) {
        self.setup(grid);
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ticks elapsed since setup/reset.
    #[inline]
    pub fn ticks_elapsed(&self) -> usize {
        self.ticks
    }

    /// Belief probability of one cell (0 outside the grid).
    pub fn belief_of(&self, grid: &GridModel, coord: CellCoord) -> f64 {
        if grid.is_valid(coord) {
            self.belief[grid.index(coord)]
        } else {
            0.0
        }
    }

    /// Snapshot of the belief as (cell, probability) pairs, zero-mass
    /// cells omitted.
    pub fn belief(&self, grid: &GridModel) -> Vec<(CellCoord, f64)> {
        self.belief
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > 0.0)
            .map(|(i, p)| (grid.coord_of(i), *p))
            .collect()
    }

    /// MAP trajectory recorded so far, one cell per tick.
    #[inline]
    pub fn map_path(&self) -> &[CellCoord] {
        self.trellis.map_path()
    }

    /// Advance belief and trellis by one `(command, reading)` pair.
    pub fn tick(
        &mut self,
        grid: &GridModel,
        command: MoveCommand,
        reading: TerrainReading,
    ) -> Result<TickOutcome, LocalizationError> {
        self.tick_with_viz(grid, command, reading, &mut NullSink)
    }

    /// [`tick`](Self::tick) with a visualization sink receiving per-cell
    /// belief labels.
    pub fn tick_with_viz(
        &mut self,
        grid: &GridModel,
        command: MoveCommand,
        reading: TerrainReading,
        viz: &mut dyn VizSink,
    ) -> Result<TickOutcome, LocalizationError> {
        if self.phase != Phase::Tracking {
            return Err(LocalizationError::NotTracking { phase: self.phase });
        }
        if grid.generation() != self.grid_generation {
            return Err(LocalizationError::StaleGrid {
                expected: self.grid_generation,
                actual: grid.generation(),
            });
        }

        // Forward filtering into the scratch buffer.
        let mut alpha = 0.0;
        for i in 0..self.belief.len() {
            let coord = grid.coord_of(i);
            let terrain = grid.terrain(coord);
            let Some(terrain) = terrain.filter(|t| t.is_walkable()) else {
                self.scratch[i] = 0.0;
                continue;
            };
            if self.pruned[i] {
                self.scratch[i] = 0.0;
                continue;
            }
            let trans = self.motion.mass_into(grid, &self.belief, coord, command);
            let raw = self.sensor.likelihood(terrain, reading) * trans;
            self.scratch[i] = raw;
            alpha += raw;
        }

        let degenerate = alpha < ALPHA_EPSILON;
        if degenerate {
            warn!(
                "[Localize] numeric degeneracy at tick {} (alpha={:.3e}); keeping previous belief",
                self.ticks + 1,
                alpha
            );
        } else {
            for raw in &mut self.scratch {
                *raw /= alpha;
            }
            std::mem::swap(&mut self.belief, &mut self.scratch);
        }

        // Parallel max-product recursion.
        let (map_cell, trellis_degenerate) = self.trellis.step(
            grid,
            &self.motion,
            &self.sensor,
            &self.pruned,
            command,
            reading,
        );

        let (peak_idx, peak_probability) = self.belief_argmax();
        let belief_peak = grid.coord_of(peak_idx);

        if self.config.pruning.enabled && !degenerate {
            self.prune_low_cells(grid, peak_idx, map_cell);
        }

        for (coord, p) in self.belief(grid) {
            viz.set_label(coord, &format!("{:.3}", p));
        }

        self.ticks += 1;
        let finished = self.ticks >= self.config.rounds;
        if finished {
            self.phase = Phase::Finished;
            debug!("[Localize] round budget exhausted after {} ticks", self.ticks);
        }

        trace!(
            "[Localize] tick {}: cmd={} read={} peak={}@{:.4} map={} degenerate={}",
            self.ticks,
            command,
            reading,
            belief_peak,
            peak_probability,
            map_cell,
            degenerate || trellis_degenerate
        );

        Ok(TickOutcome {
            map_cell,
            belief_peak,
            peak_probability,
            degenerate: degenerate || trellis_degenerate,
            ticks: self.ticks,
            finished,
        })
    }

    /// Replay an entire trace, one tick per step.
    ///
    /// Exhausting the trace transitions to `Finished` even when the round
    /// budget has ticks left.
    pub fn run_trace(
        &mut self,
        grid: &GridModel,
        trace: &Trace,
    ) -> Result<ReplaySummary, LocalizationError> {
        let mut degenerate_ticks = 0;
        for step in trace.steps() {
            if self.phase != Phase::Tracking {
                break;
            }
            let outcome = self.tick(grid, step.command, step.reading)?;
            if outcome.degenerate {
                degenerate_ticks += 1;
            }
        }
        self.phase = Phase::Finished;
        Ok(ReplaySummary {
            ticks: self.ticks,
            map_path: self.map_path().to_vec(),
            degenerate_ticks,
        })
    }

    /// Index and value of the belief maximum.
    fn belief_argmax(&self) -> (usize, f64) {
        let mut best = 0;
        for i in 1..self.belief.len() {
            if self.belief[i] > self.belief[best] {
                best = i;
            }
        }
        (best, self.belief[best])
    }

    /// Mark persistently-negligible cells as pruned and renormalize the
    /// survivors. The belief peak and current MAP cell are exempt.
    fn prune_low_cells(&mut self, grid: &GridModel, peak_idx: usize, map_cell: CellCoord) {
        let active = self
            .pruned
            .iter()
            .zip(self.belief.iter())
            .filter(|(pruned, p)| !**pruned && **p > 0.0)
            .count()
            .max(1);
        let threshold = self.config.pruning.threshold_factor / active as f64;
        let map_idx = grid.index(map_cell);

        let mut removed_mass = 0.0;
        for i in 0..self.belief.len() {
            if self.pruned[i] || !grid.is_walkable(grid.coord_of(i)) {
                continue;
            }
            if self.belief[i] < threshold {
                self.low_streak[i] += 1;
            } else {
                self.low_streak[i] = 0;
            }
            if self.low_streak[i] >= self.config.pruning.patience
                && i != peak_idx
                && i != map_idx
            {
                self.pruned[i] = true;
                removed_mass += self.belief[i];
                self.belief[i] = 0.0;
            }
        }

        if removed_mass > 0.0 {
            let remaining = 1.0 - removed_mass;
            if remaining > ALPHA_EPSILON {
                for p in &mut self.belief {
                    *p /= remaining;
                }
            }
            trace!(
                "[Localize] pruned cells holding {:.3e} mass ({} still active)",
                removed_mass,
                self.pruned.iter().filter(|p| !**p).count()
            );
        }
    }
}
