//! Command transition model for the belief filter.
//!
//! A commanded move succeeds with probability `success_rate`; otherwise the
//! agent stays put. A command that would push the agent off the grid or
//! into a blocked cell cannot succeed, so its success mass also stays on
//! the source cell.

use crate::core::{CellCoord, MoveCommand};
use crate::grid::GridModel;

/// Configuration for the command transition model.
#[derive(Clone, Copy, Debug)]
pub struct MotionModel {
    success_rate: f64,
}

impl MotionModel {
    /// Create a model with the given move success probability.
    pub fn new(success_rate: f64) -> Self {
        Self { success_rate }
    }

    /// Move success probability.
    #[inline]
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// The three probability contributions flowing into destination `dest`
    /// under command `command`, reading from the previous-tick belief:
    ///
    /// - the agent was at `dest` and the move failed
    /// - the agent was at the predecessor opposite the command and the
    ///   move succeeded
    /// - the agent was at `dest` and the commanded move was impossible
    ///   (edge or blocked ahead), so "success" also meant staying
    ///
    /// Pruned or blocked predecessors hold zero belief, so they drop out
    /// without an explicit check.
    fn contributions(
        &self,
        grid: &GridModel,
        prev: &[f64],
        dest: CellCoord,
        command: MoveCommand,
    ) -> (f64, f64, f64) {
        let here = prev[grid.index(dest)];
        let stay_failed = (1.0 - self.success_rate) * here;

        let pred = dest - command.offset();
        let from_pred = if grid.is_walkable(pred) {
            self.success_rate * prev[grid.index(pred)]
        } else {
            0.0
        };

        let ahead = dest + command.offset();
        let stay_forced = if grid.is_walkable(ahead) {
            0.0
        } else {
            self.success_rate * here
        };

        (stay_failed, from_pred, stay_forced)
    }

    /// Sum-product transition mass into `dest` (forward filtering).
    pub fn mass_into(
        &self,
        grid: &GridModel,
        prev: &[f64],
        dest: CellCoord,
        command: MoveCommand,
    ) -> f64 {
        let (stay_failed, from_pred, stay_forced) =
            self.contributions(grid, prev, dest, command);
        stay_failed + from_pred + stay_forced
    }

    /// Max-product transition mass into `dest` (Viterbi).
    ///
    /// The two stay terms describe the same predecessor (`dest` itself),
    /// so they combine before competing with the predecessor path.
    pub fn max_into(
        &self,
        grid: &GridModel,
        prev: &[f64],
        dest: CellCoord,
        command: MoveCommand,
    ) -> f64 {
        let (stay_failed, from_pred, stay_forced) =
            self.contributions(grid, prev, dest, command);
        (stay_failed + stay_forced).max(from_pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;

    fn uniform_belief(grid: &GridModel) -> Vec<f64> {
        let p = 1.0 / grid.walkable_count() as f64;
        (0..grid.cell_count())
            .map(|i| {
                if grid.is_walkable(grid.coord_of(i)) {
                    p
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn test_mass_conserved_on_open_grid() {
        let grid = GridModel::with_unit_cells(4, 4);
        let prev = uniform_belief(&grid);
        let model = MotionModel::new(0.9);

        let total: f64 = (0..grid.cell_count())
            .map(|i| model.mass_into(&grid, &prev, grid.coord_of(i), MoveCommand::Right))
            .sum();

        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_certain_move_shifts_mass() {
        let grid = GridModel::with_unit_cells(1, 3);
        // All mass on the west cell.
        let mut prev = vec![0.0; 3];
        prev[0] = 1.0;
        let model = MotionModel::new(1.0);

        assert_eq!(
            model.mass_into(&grid, &prev, CellCoord::new(0, 1), MoveCommand::Right),
            1.0
        );
        assert_eq!(
            model.mass_into(&grid, &prev, CellCoord::new(0, 0), MoveCommand::Right),
            0.0
        );
    }

    #[test]
    fn test_edge_absorbs_impossible_move() {
        let grid = GridModel::with_unit_cells(1, 2);
        // All mass on the east cell; commanding Right cannot succeed there.
        let mut prev = vec![0.0; 2];
        prev[1] = 1.0;
        let model = MotionModel::new(0.9);

        let stay = model.mass_into(&grid, &prev, CellCoord::new(0, 1), MoveCommand::Right);
        assert!((stay - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_blocked_neighbor_absorbs_like_an_edge() {
        let grid = GridModel::from_ascii(".#\n", 1.0, WorldPoint::ZERO).unwrap();
        let mut prev = vec![0.0; 2];
        prev[0] = 1.0;
        let model = MotionModel::new(0.7);

        let stay = model.mass_into(&grid, &prev, CellCoord::new(0, 0), MoveCommand::Right);
        assert!((stay - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_into_picks_best_explanation() {
        let grid = GridModel::with_unit_cells(1, 3);
        let mut prev = vec![0.0; 3];
        prev[0] = 0.6; // predecessor of cell 1
        prev[1] = 0.4;
        let model = MotionModel::new(0.9);

        // Arriving from cell 0: 0.9 * 0.6 = 0.54; staying failed: 0.1 * 0.4.
        let best = model.max_into(&grid, &prev, CellCoord::new(0, 1), MoveCommand::Right);
        assert!((best - 0.54).abs() < 1e-12);
    }
}
