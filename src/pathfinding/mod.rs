//! A* pathfinding over the terrain grid.
//!
//! Implements A* search with:
//! - a terrain-pair edge cost model (highway discounts, diagonal blending)
//! - an approximate goal test (radius around a world-space target)
//! - deterministic tie-breaking for reproducible paths
//! - a per-call node expansion budget

mod cost;
mod planner;
mod types;

pub use cost::{edge_cost, DUAL_HIGHWAY_DISCOUNT, HIGHWAY_DISCOUNT, MIN_EDGE_COST};
pub use planner::AStarPlanner;
pub use types::{AStarConfig, PathFailure, PathResult};

use crate::core::WorldPoint;
use crate::grid::GridModel;

/// Quick path finding with the default configuration.
pub fn find_path(grid: &GridModel, origin: WorldPoint, target: WorldPoint) -> PathResult {
    let planner = AStarPlanner::with_defaults(grid);
    planner.find_path_world(origin, target)
}

/// Check whether a path exists (same work as a full search).
pub fn path_exists(grid: &GridModel, origin: WorldPoint, target: WorldPoint) -> bool {
    find_path(grid, origin, target).is_success()
}
