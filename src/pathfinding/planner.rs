//! A* planner implementation.

use log::{debug, trace};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::core::{CellCoord, WorldPoint};
use crate::grid::GridModel;
use crate::viz::{Color, NullSink, VizSink};

use super::cost::edge_cost;
use super::types::{AStarConfig, AStarNode, PathFailure, PathResult};

/// Terrain-aware A* pathfinder borrowing the grid it searches.
pub struct AStarPlanner<'a> {
    grid: &'a GridModel,
    config: AStarConfig,
}

impl<'a> AStarPlanner<'a> {
    /// Create a new planner.
    pub fn new(grid: &'a GridModel, config: AStarConfig) -> Self {
        Self { grid, config }
    }

    /// Create with the default configuration scaled to the grid's cell size.
    pub fn with_defaults(grid: &'a GridModel) -> Self {
        Self::new(grid, AStarConfig::for_cell_size(grid.cell_size()))
    }

    /// Find a path from a world-space origin to a world-space target.
    ///
    /// The origin must resolve to a discrete cell; a position straddling a
    /// cell boundary fails with [`PathFailure::AgentInTransit`] before any
    /// search work.
    pub fn find_path_world(&self, origin: WorldPoint, target: WorldPoint) -> PathResult {
        self.find_path_world_with_viz(origin, target, &mut NullSink)
    }

    /// [`find_path_world`](Self::find_path_world) with a visualization sink.
    pub fn find_path_world_with_viz(
        &self,
        origin: WorldPoint,
        target: WorldPoint,
        viz: &mut dyn VizSink,
    ) -> PathResult {
        let Some(origin_cell) = self.grid.find_agent_cell(origin) else {
            debug!(
                "[AStar] FAILED: AgentInTransit at ({:.3},{:.3})",
                origin.x, origin.y
            );
            return PathResult::failed(PathFailure::AgentInTransit, 0);
        };
        self.find_path_with_viz(origin_cell, target, viz)
    }

    /// Find a path from an origin cell toward a world-space target.
    ///
    /// The goal test accepts any cell whose center lies within the
    /// configured radius of `target`, so targets between cell centers are
    /// fine.
    pub fn find_path(&self, origin: CellCoord, target: WorldPoint) -> PathResult {
        self.find_path_with_viz(origin, target, &mut NullSink)
    }

    /// [`find_path`](Self::find_path) with a visualization sink.
    pub fn find_path_with_viz(
        &self,
        origin: CellCoord,
        target: WorldPoint,
        viz: &mut dyn VizSink,
    ) -> PathResult {
        trace!(
            "[AStar] find_path: origin={} target=({:.3},{:.3})",
            origin,
            target.x,
            target.y
        );

        if !self.grid.is_valid(origin) || !self.target_in_bounds(target) {
            debug!("[AStar] FAILED: OutOfBounds - origin or target outside grid");
            return PathResult::failed(PathFailure::OutOfBounds, 0);
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set: HashSet<CellCoord> = HashSet::new();
        let mut came_from: HashMap<CellCoord, CellCoord> = HashMap::new();
        let mut g_scores: HashMap<CellCoord, f64> = HashMap::new();
        let mut seq: u64 = 0;

        if self.grid.is_walkable(origin) {
            open_set.push(AStarNode {
                coord: origin,
                g_cost: 0.0,
                f_cost: self.heuristic(origin, target),
                seq,
            });
            g_scores.insert(origin, 0.0);
        }

        let mut nodes_expanded = 0;

        while let Some(current) = open_set.pop() {
            if closed_set.contains(&current.coord) {
                continue;
            }
            closed_set.insert(current.coord);

            nodes_expanded += 1;
            if nodes_expanded > self.config.max_expansions {
                debug!(
                    "[AStar] FAILED: BudgetExceeded ({} nodes)",
                    nodes_expanded
                );
                return PathResult::failed(PathFailure::BudgetExceeded, nodes_expanded);
            }

            if self.is_goal(current.coord, target) {
                return self.reconstruct_path(
                    &came_from,
                    current.coord,
                    current.g_cost,
                    nodes_expanded,
                    viz,
                );
            }

            viz.highlight(current.coord, Color::YELLOW, 0.7);

            let current_terrain = match self.grid.terrain(current.coord) {
                Some(t) => t,
                None => continue,
            };

            for (neighbor, dir) in self.grid.neighbors(current.coord) {
                if closed_set.contains(&neighbor) || !self.grid.is_walkable(neighbor) {
                    continue;
                }
                let neighbor_terrain = match self.grid.terrain(neighbor) {
                    Some(t) => t,
                    None => continue,
                };

                let step = edge_cost(current_terrain, neighbor_terrain, dir.is_diagonal());
                let tentative_g = current.g_cost + step;

                let best_g = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative_g < best_g {
                    came_from.insert(neighbor, current.coord);
                    g_scores.insert(neighbor, tentative_g);

                    seq += 1;
                    open_set.push(AStarNode {
                        coord: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + self.heuristic(neighbor, target),
                        seq,
                    });
                    viz.highlight(neighbor, Color::WHITE, 0.3);
                }
            }
        }

        debug!(
            "[AStar] FAILED: Unreachable after expanding {} nodes",
            nodes_expanded
        );
        PathResult::failed(PathFailure::Unreachable, nodes_expanded)
    }

    /// Does the cell satisfy the approximate goal test?
    fn is_goal(&self, coord: CellCoord, target: WorldPoint) -> bool {
        self.grid.cell_center(coord).distance(&target) <= self.config.goal_radius
    }

    /// Euclidean goal-distance heuristic, scaled by the configured weight.
    fn heuristic(&self, coord: CellCoord, target: WorldPoint) -> f64 {
        if !self.config.use_heuristic {
            return 0.0;
        }
        self.grid.cell_center(coord).distance(&target) * self.config.heuristic_weight
    }

    /// Is the target close enough to the grid to ever satisfy a goal test?
    fn target_in_bounds(&self, target: WorldPoint) -> bool {
        let cell = self.grid.world_to_cell(target);
        let clamped = CellCoord::new(
            cell.row.clamp(0, self.grid.rows() as i32 - 1),
            cell.col.clamp(0, self.grid.cols() as i32 - 1),
        );
        self.grid.cell_center(clamped).distance(&target)
            <= self.config.goal_radius + self.grid.cell_size()
    }

    /// Walk parent pointers back to the origin and reverse.
    fn reconstruct_path(
        &self,
        came_from: &HashMap<CellCoord, CellCoord>,
        goal: CellCoord,
        cost: f64,
        nodes_expanded: usize,
        viz: &mut dyn VizSink,
    ) -> PathResult {
        let mut path = Vec::new();
        let mut current = goal;

        while let Some(&prev) = came_from.get(&current) {
            path.push(current);
            current = prev;
        }
        path.push(current); // origin
        path.reverse();

        let path_world: Vec<WorldPoint> =
            path.iter().map(|c| self.grid.cell_center(*c)).collect();

        for cell in &path {
            viz.highlight(*cell, Color::GREEN, 1.0);
        }

        trace!(
            "[AStar] SUCCESS: path length={} cells, cost={:.3}, nodes_expanded={}",
            path.len(),
            cost,
            nodes_expanded
        );

        PathResult {
            path,
            path_world,
            cost,
            nodes_expanded,
            failure: None,
        }
    }
}
