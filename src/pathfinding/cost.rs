//! Terrain-pair edge cost model.
//!
//! The cost of a move depends on the terrain classes of both endpoints and
//! on whether the step is straight or diagonal:
//!
//! - straight: the destination's difficulty
//! - diagonal: sqrt(2) times the mean difficulty of the two endpoints
//! - highways discount the move: x0.5 with one highway endpoint, x0.25
//!   with two
//!
//! Blocked endpoints have no cost; the planner never expands them.

use crate::core::TerrainClass;

/// Diagonal step length multiplier.
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Discount applied when exactly one endpoint is a highway.
pub const HIGHWAY_DISCOUNT: f64 = 0.5;

/// Discount applied when both endpoints are highways.
pub const DUAL_HIGHWAY_DISCOUNT: f64 = 0.25;

/// Cheapest possible per-cell traversal cost under this model
/// (a straight move between two highway cells).
pub const MIN_EDGE_COST: f64 = DUAL_HIGHWAY_DISCOUNT;

/// Cost of one move between two walkable cells.
///
/// `from` and `to` must be walkable; blocked cells never reach the cost
/// model.
pub fn edge_cost(from: TerrainClass, to: TerrainClass, diagonal: bool) -> f64 {
    debug_assert!(from.is_walkable() && to.is_walkable());

    let base = if diagonal {
        SQRT_2 * (from.difficulty() + to.difficulty()) / 2.0
    } else {
        to.difficulty()
    };

    base * highway_discount(from, to)
}

fn highway_discount(from: TerrainClass, to: TerrainClass) -> f64 {
    match (from == TerrainClass::Highway, to == TerrainClass::Highway) {
        (true, true) => DUAL_HIGHWAY_DISCOUNT,
        (true, false) | (false, true) => HIGHWAY_DISCOUNT,
        (false, false) => 1.0,
    }
}
