//! Max-product (Viterbi) trellis over grid cells.
//!
//! Runs alongside the forward filter with the same sensor term but a max
//! instead of a sum over predecessor contributions. Each tick records the
//! cell with the highest trellis value, building the maximum-a-posteriori
//! trajectory of the run.

use log::warn;

use crate::core::{CellCoord, MoveCommand, TerrainReading};
use crate::grid::GridModel;

use super::motion::MotionModel;
use super::sensor::SensorModel;
use super::ALPHA_EPSILON;

/// Per-cell max-path probabilities plus the running MAP path.
#[derive(Clone, Debug)]
pub struct ViterbiTrellis {
    /// Max-path probability per cell, normalized each tick
    values: Vec<f64>,
    /// Next-tick buffer; tick t never reads what it wrote
    scratch: Vec<f64>,
    /// Per-tick argmax cells since the last reset
    map_path: Vec<CellCoord>,
}

impl ViterbiTrellis {
    /// Create a trellis over `cell_count` cells, all zero.
    pub fn new(cell_count: usize) -> Self {
        Self {
            values: vec![0.0; cell_count],
            scratch: vec![0.0; cell_count],
            map_path: Vec::new(),
        }
    }

    /// Reset to the same prior as the belief: uniform over walkable cells.
    pub fn reset_uniform(&mut self, grid: &GridModel) {
        let prior = 1.0 / grid.walkable_count().max(1) as f64;
        for i in 0..self.values.len() {
            self.values[i] = if grid.is_walkable(grid.coord_of(i)) {
                prior
            } else {
                0.0
            };
        }
        self.map_path.clear();
    }

    /// Trellis value of one cell.
    #[inline]
    pub fn value_at(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// MAP cells recorded so far, one per tick.
    #[inline]
    pub fn map_path(&self) -> &[CellCoord] {
        &self.map_path
    }

    /// Advance the trellis one tick and append the new MAP cell.
    ///
    /// Reads only the previous-tick values and writes a fresh buffer; the
    /// swap happens after the full pass. A collapsed (all ~zero) update
    /// keeps the previous values, mirroring the filter's degeneracy rule.
    ///
    /// Returns the MAP cell and whether the update degenerated.
    pub fn step(
        &mut self,
        grid: &GridModel,
        motion: &MotionModel,
        sensor: &SensorModel,
        pruned: &[bool],
        command: MoveCommand,
        reading: TerrainReading,
    ) -> (CellCoord, bool) {
        let mut alpha = 0.0;
        for i in 0..self.values.len() {
            let coord = grid.coord_of(i);
            let terrain = grid.terrain(coord);
            let Some(terrain) = terrain.filter(|t| t.is_walkable()) else {
                self.scratch[i] = 0.0;
                continue;
            };
            if pruned[i] {
                self.scratch[i] = 0.0;
                continue;
            }
            let trans = motion.max_into(grid, &self.values, coord, command);
            let value = sensor.likelihood(terrain, reading) * trans;
            self.scratch[i] = value;
            alpha += value;
        }

        let degenerate = alpha < ALPHA_EPSILON;
        if degenerate {
            warn!("[Viterbi] collapsed trellis (alpha ~ 0); keeping previous values");
        } else {
            for value in &mut self.scratch {
                *value /= alpha;
            }
            std::mem::swap(&mut self.values, &mut self.scratch);
        }

        let map_cell = self.argmax(grid);
        self.map_path.push(map_cell);
        (map_cell, degenerate)
    }

    /// Cell with the highest trellis value; ties take the lowest linear
    /// index, keeping MAP paths reproducible.
    pub fn argmax(&self, grid: &GridModel) -> CellCoord {
        let mut best = 0;
        for i in 1..self.values.len() {
            if self.values[i] > self.values[best] {
                best = i;
            }
        }
        grid.coord_of(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;

    fn models() -> (MotionModel, SensorModel) {
        (MotionModel::new(0.9), SensorModel::new(0.9))
    }

    #[test]
    fn test_reset_is_uniform_over_walkable() {
        let grid = GridModel::from_ascii("..#\n...\n", 1.0, WorldPoint::ZERO).unwrap();
        let mut trellis = ViterbiTrellis::new(grid.cell_count());
        trellis.reset_uniform(&grid);

        assert_eq!(trellis.value_at(2), 0.0);
        assert!((trellis.value_at(0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_map_path_grows_one_per_step() {
        let grid = GridModel::with_unit_cells(3, 3);
        let (motion, sensor) = models();
        let pruned = vec![false; grid.cell_count()];
        let mut trellis = ViterbiTrellis::new(grid.cell_count());
        trellis.reset_uniform(&grid);

        for i in 0..5 {
            trellis.step(
                &grid,
                &motion,
                &sensor,
                &pruned,
                MoveCommand::Right,
                TerrainReading::Normal,
            );
            assert_eq!(trellis.map_path().len(), i + 1);
        }
    }

    #[test]
    fn test_deterministic_walk_tracks_truth() {
        // Distinctive terrain makes the readings informative.
        let grid = GridModel::from_ascii("h.t\n", 1.0, WorldPoint::ZERO).unwrap();
        let motion = MotionModel::new(1.0);
        let sensor = SensorModel::new(0.95);
        let pruned = vec![false; grid.cell_count()];
        let mut trellis = ViterbiTrellis::new(grid.cell_count());
        trellis.reset_uniform(&grid);

        // True walk: start anywhere, move Right twice reading . then t.
        trellis.step(
            &grid,
            &motion,
            &sensor,
            &pruned,
            MoveCommand::Right,
            TerrainReading::Normal,
        );
        let (map_cell, degenerate) = trellis.step(
            &grid,
            &motion,
            &sensor,
            &pruned,
            MoveCommand::Right,
            TerrainReading::Difficult,
        );

        assert!(!degenerate);
        assert_eq!(map_cell, CellCoord::new(0, 2));
    }
}
