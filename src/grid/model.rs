//! Terrain grid storage and adjacency queries.
//!
//! The grid is a fixed-size row-major array of terrain classes. Topology is
//! immutable after construction; terrain classes may be edited, and every
//! edit bumps a generation counter so long-lived readers can detect that
//! their snapshot went stale.

use log::trace;
use rand::Rng;

use crate::core::{CellCoord, Direction, TerrainClass, WorldPoint};

use super::GridError;

/// Attempts at rejection-sampling a random walkable cell before falling
/// back to a linear scan.
const RANDOM_CELL_ATTEMPTS: usize = 64;

/// Fraction of the cell size within which a world position counts as
/// straddling a cell boundary.
const BOUNDARY_EPSILON_FRACTION: f64 = 0.05;

/// Terrain grid with 8-connected adjacency.
///
/// The coordinate system:
/// - cell (0, 0) is the north-west corner, at `origin` in world space
/// - `x` grows eastward with the column, `y` grows southward with the row
/// - cell (r, c) covers `origin + (c..c+1, r..r+1) * cell_size`
#[derive(Clone, Debug)]
pub struct GridModel {
    /// Terrain classes, row-major
    terrain: Vec<TerrainClass>,
    /// Grid height in cells
    rows: usize,
    /// Grid width in cells
    cols: usize,
    /// Edge length of one cell in meters
    cell_size: f64,
    /// World coordinates of the north-west grid corner
    origin: WorldPoint,
    /// Bumped on every terrain edit
    generation: u64,
}

impl GridModel {
    /// Create a grid with every cell set to `Normal`.
    pub fn new(rows: usize, cols: usize, cell_size: f64, origin: WorldPoint) -> Self {
        Self {
            terrain: vec![TerrainClass::Normal; rows * cols],
            rows,
            cols,
            cell_size,
            origin,
            generation: 0,
        }
    }

    /// Create a grid at the world origin with unit cells.
    pub fn with_unit_cells(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, 1.0, WorldPoint::ZERO)
    }

    /// Parse a grid from its ASCII map form: one row per line, one
    /// terrain character per cell (`h`, `.`, `t`, `#`).
    pub fn from_ascii(map: &str, cell_size: f64, origin: WorldPoint) -> Result<Self, GridError> {
        let lines: Vec<&str> = map.lines().filter(|l| !l.trim().is_empty()).collect();
        let rows = lines.len();
        let cols = lines.first().map(|l| l.chars().count()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyMap);
        }

        let mut terrain = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(GridError::RaggedRow { row, expected: cols });
            }
            for (col, c) in line.chars().enumerate() {
                let class = TerrainClass::from_char(c).ok_or(GridError::InvalidChar {
                    row,
                    col,
                    found: c,
                })?;
                terrain.push(class);
            }
        }

        Ok(Self {
            terrain,
            rows,
            cols,
            cell_size,
            origin,
            generation: 0,
        })
    }

    /// Render the grid as its ASCII map form.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.push(self.terrain[row * self.cols + col].as_char());
            }
            out.push('\n');
        }
        out
    }

    /// Grid height in cells
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid width in cells
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Edge length of one cell in meters
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Current terrain generation; bumped on every edit.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bounds check only; terrain validity is a separate concern.
    #[inline]
    pub fn is_valid(&self, coord: CellCoord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// False iff out of bounds or `Blocked`.
    #[inline]
    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.is_valid(coord) && self.terrain[self.index(coord)].is_walkable()
    }

    /// Terrain class at `coord`; `None` out of bounds.
    #[inline]
    pub fn terrain(&self, coord: CellCoord) -> Option<TerrainClass> {
        if self.is_valid(coord) {
            Some(self.terrain[self.index(coord)])
        } else {
            None
        }
    }

    /// Flat row-major index of an in-bounds coordinate.
    #[inline]
    pub fn index(&self, coord: CellCoord) -> usize {
        debug_assert!(self.is_valid(coord));
        coord.row as usize * self.cols + coord.col as usize
    }

    /// Coordinate of a flat row-major index.
    #[inline]
    pub fn coord_of(&self, index: usize) -> CellCoord {
        CellCoord::new((index / self.cols) as i32, (index % self.cols) as i32)
    }

    /// Rewrite the terrain class of a cell and bump the generation.
    pub fn set_terrain(&mut self, coord: CellCoord, class: TerrainClass) -> Result<(), GridError> {
        if !self.is_valid(coord) {
            return Err(GridError::InvalidCoordinate { coord });
        }
        let idx = self.index(coord);
        self.terrain[idx] = class;
        self.generation += 1;
        trace!(
            "[Grid] set_terrain {} -> {:?} (generation {})",
            coord,
            class,
            self.generation
        );
        Ok(())
    }

    /// The up-to-8 in-bounds neighbors of `coord`, tagged with their
    /// compass direction. No wrap-around.
    pub fn neighbors(&self, coord: CellCoord) -> Vec<(CellCoord, Direction)> {
        let mut out = Vec::with_capacity(8);
        for dir in Direction::ALL {
            let next = coord + dir.offset();
            if self.is_valid(next) {
                out.push((next, dir));
            }
        }
        out
    }

    /// Number of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.terrain.iter().filter(|t| t.is_walkable()).count()
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.cell_count() - self.walkable_count()
    }

    /// Uniform random choice among walkable cells; `None` when the grid
    /// has none.
    ///
    /// Rejection-samples for a bounded number of attempts, then falls back
    /// to an exact uniform pick over the walkable set.
    pub fn random_walkable_cell<R: Rng>(&self, rng: &mut R) -> Option<CellCoord> {
        for _ in 0..RANDOM_CELL_ATTEMPTS {
            let idx = rng.gen_range(0..self.cell_count());
            if self.terrain[idx].is_walkable() {
                return Some(self.coord_of(idx));
            }
        }

        // Mostly-blocked grid: enumerate instead of sampling further.
        let walkable: Vec<usize> = (0..self.cell_count())
            .filter(|&i| self.terrain[i].is_walkable())
            .collect();
        if walkable.is_empty() {
            return None;
        }
        Some(self.coord_of(walkable[rng.gen_range(0..walkable.len())]))
    }

    /// World coordinates of a cell center.
    #[inline]
    pub fn cell_center(&self, coord: CellCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.col as f64 + 0.5) * self.cell_size,
            self.origin.y + (coord.row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Convert a world position to the enclosing cell coordinate, without
    /// bounds or boundary checks.
    #[inline]
    pub fn world_to_cell(&self, point: WorldPoint) -> CellCoord {
        CellCoord::new(
            ((point.y - self.origin.y) / self.cell_size).floor() as i32,
            ((point.x - self.origin.x) / self.cell_size).floor() as i32,
        )
    }

    /// Resolve a continuous-space position to the enclosing cell.
    ///
    /// Returns `None` when the position is out of bounds or straddles a
    /// cell boundary (agent mid-transition). Callers treat `None` as a
    /// retryable condition, not an error.
    pub fn find_agent_cell(&self, position: WorldPoint) -> Option<CellCoord> {
        let fx = (position.x - self.origin.x) / self.cell_size;
        let fy = (position.y - self.origin.y) / self.cell_size;

        let near_line =
            |v: f64| (v - v.round()).abs() < BOUNDARY_EPSILON_FRACTION;
        if near_line(fx) || near_line(fy) {
            return None;
        }

        let coord = CellCoord::new(fy.floor() as i32, fx.floor() as i32);
        if self.is_valid(coord) {
            Some(coord)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid_3x3() -> GridModel {
        GridModel::from_ascii(".t#\nh..\n...\n", 1.0, WorldPoint::ZERO).unwrap()
    }

    #[test]
    fn test_from_ascii() {
        let grid = grid_3x3();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.terrain(CellCoord::new(0, 1)), Some(TerrainClass::Difficult));
        assert_eq!(grid.terrain(CellCoord::new(0, 2)), Some(TerrainClass::Blocked));
        assert_eq!(grid.terrain(CellCoord::new(1, 0)), Some(TerrainClass::Highway));
    }

    #[test]
    fn test_ascii_round_trip() {
        let grid = grid_3x3();
        let redone = GridModel::from_ascii(&grid.to_ascii(), 1.0, WorldPoint::ZERO).unwrap();
        assert_eq!(redone.to_ascii(), grid.to_ascii());
    }

    #[test]
    fn test_from_ascii_rejects_bad_input() {
        assert!(matches!(
            GridModel::from_ascii("", 1.0, WorldPoint::ZERO),
            Err(GridError::EmptyMap)
        ));
        assert!(matches!(
            GridModel::from_ascii("..\n.\n", 1.0, WorldPoint::ZERO),
            Err(GridError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            GridModel::from_ascii(".x\n..\n", 1.0, WorldPoint::ZERO),
            Err(GridError::InvalidChar { found: 'x', .. })
        ));
    }

    #[test]
    fn test_validity_and_walkability() {
        let grid = grid_3x3();
        assert!(grid.is_valid(CellCoord::new(0, 2)));
        assert!(!grid.is_valid(CellCoord::new(-1, 0)));
        assert!(!grid.is_valid(CellCoord::new(3, 0)));
        assert!(grid.is_walkable(CellCoord::new(0, 0)));
        assert!(!grid.is_walkable(CellCoord::new(0, 2))); // blocked
        assert!(!grid.is_walkable(CellCoord::new(0, 3))); // out of bounds
    }

    #[test]
    fn test_neighbors_corner_and_center() {
        let grid = grid_3x3();
        let corner = grid.neighbors(CellCoord::new(0, 0));
        assert_eq!(corner.len(), 3);
        let center = grid.neighbors(CellCoord::new(1, 1));
        assert_eq!(center.len(), 8);
        for (coord, dir) in center {
            assert_eq!(CellCoord::new(1, 1) + dir.offset(), coord);
        }
    }

    #[test]
    fn test_neighbors_no_wrap_around() {
        let grid = grid_3x3();
        for (coord, _) in grid.neighbors(CellCoord::new(2, 2)) {
            assert!(grid.is_valid(coord));
            assert!(coord.is_adjacent_8(&CellCoord::new(2, 2)));
        }
    }

    #[test]
    fn test_set_terrain_bumps_generation() {
        let mut grid = grid_3x3();
        assert_eq!(grid.generation(), 0);
        grid.set_terrain(CellCoord::new(0, 0), TerrainClass::Difficult)
            .unwrap();
        assert_eq!(grid.generation(), 1);
        assert!(grid
            .set_terrain(CellCoord::new(9, 9), TerrainClass::Normal)
            .is_err());
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn test_random_walkable_cell() {
        let grid = grid_3x3();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let cell = grid.random_walkable_cell(&mut rng).unwrap();
            assert!(grid.is_walkable(cell));
        }
    }

    #[test]
    fn test_random_walkable_cell_all_blocked() {
        let grid = GridModel::from_ascii("##\n##\n", 1.0, WorldPoint::ZERO).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(grid.random_walkable_cell(&mut rng), None);
    }

    #[test]
    fn test_cell_center_world_round_trip() {
        let grid = GridModel::new(4, 6, 0.5, WorldPoint::new(-1.0, 2.0));
        for row in 0..4 {
            for col in 0..6 {
                let coord = CellCoord::new(row, col);
                assert_eq!(grid.world_to_cell(grid.cell_center(coord)), coord);
            }
        }
    }

    #[test]
    fn test_find_agent_cell() {
        let grid = GridModel::with_unit_cells(3, 3);
        // Dead center of (1, 1)
        assert_eq!(
            grid.find_agent_cell(WorldPoint::new(1.5, 1.5)),
            Some(CellCoord::new(1, 1))
        );
        // Straddling the vertical line between columns 0 and 1
        assert_eq!(grid.find_agent_cell(WorldPoint::new(1.0, 0.5)), None);
        // Out of bounds
        assert_eq!(grid.find_agent_cell(WorldPoint::new(7.5, 0.5)), None);
    }

    #[test]
    fn test_counts() {
        let grid = grid_3x3();
        assert_eq!(grid.cell_count(), 9);
        assert_eq!(grid.walkable_count(), 8);
        assert_eq!(grid.blocked_count(), 1);
    }
}
