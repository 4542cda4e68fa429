//! A* search types.

use std::cmp::Ordering;

use crate::core::{CellCoord, WorldPoint};

/// A node in the A* open set.
///
/// Ordering is by `f` ascending, with a deterministic tie-break: equal-`f`
/// nodes prefer the larger `g` (deeper along the path), then the earlier
/// insertion. Identical inputs therefore always produce identical paths.
#[derive(Clone, Debug)]
pub(super) struct AStarNode {
    pub coord: CellCoord,
    /// Accumulated edge cost from the origin
    pub g_cost: f64,
    /// g_cost + heuristic
    pub f_cost: f64,
    /// Insertion sequence number, the final tie-break
    pub seq: u64,
}

impl Eq for AStarNode {}

impl PartialEq for AStarNode {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                self.g_cost
                    .partial_cmp(&other.g_cost)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* configuration.
#[derive(Clone, Debug)]
pub struct AStarConfig {
    /// Use the Euclidean goal-distance heuristic; disabling degenerates
    /// to uniform-cost search (Dijkstra)
    pub use_heuristic: bool,
    /// Scale applied to the heuristic term
    pub heuristic_weight: f64,
    /// A cell satisfies the goal when its center lies within this world
    /// distance of the target position
    pub goal_radius: f64,
    /// Maximum node expansions before the search gives up
    pub max_expansions: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            use_heuristic: true,
            heuristic_weight: 1.0,
            goal_radius: 0.75,
            max_expansions: 100_000,
        }
    }
}

impl AStarConfig {
    /// Goal radius of 1.5x the cell radius, the conventional default for
    /// targets that fall between cell centers.
    pub fn for_cell_size(cell_size: f64) -> Self {
        Self {
            goal_radius: cell_size * 0.75,
            ..Default::default()
        }
    }

    /// Uniform-cost search configuration (heuristic disabled).
    pub fn dijkstra() -> Self {
        Self {
            use_heuristic: false,
            ..Default::default()
        }
    }
}

/// Result of an A* search.
#[derive(Clone, Debug)]
pub struct PathResult {
    /// Path as cell coordinates, origin first (empty on failure)
    pub path: Vec<CellCoord>,
    /// Path as world-space cell centers
    pub path_world: Vec<WorldPoint>,
    /// Total edge cost of the path
    pub cost: f64,
    /// Number of nodes expanded during the search
    pub nodes_expanded: usize,
    /// Reason the search failed, if it did
    pub failure: Option<PathFailure>,
}

impl PathResult {
    /// Create a failed result.
    pub(super) fn failed(failure: PathFailure, nodes_expanded: usize) -> Self {
        Self {
            path: Vec::new(),
            path_world: Vec::new(),
            cost: f64::INFINITY,
            nodes_expanded,
            failure: Some(failure),
        }
    }

    /// Did the search produce a path?
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Path length in cells.
    #[inline]
    pub fn length_cells(&self) -> usize {
        self.path.len()
    }
}

/// Reason an A* search produced no path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathFailure {
    /// The frontier was exhausted without satisfying the goal test
    Unreachable,
    /// The origin world position does not resolve to a discrete cell
    AgentInTransit,
    /// Origin or goal is outside the grid
    OutOfBounds,
    /// The expansion budget ran out before the goal was reached
    BudgetExceeded,
}
