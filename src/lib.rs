//! # Marga-Nav: Terrain-Aware Pathfinding & Grid Localization
//!
//! A library for agents moving on a discretized 2D world, providing the
//! two capabilities such agents need:
//!
//! - **Pathfinding**: A* search over a terrain-weighted grid with a
//!   terrain-pair edge cost model (highway discounts, diagonal blending)
//!   and an approximate world-space goal test
//! - **Localization**: a hidden-Markov-model belief tracker combining a
//!   noisy-move motion model with a noisy terrain sensor, running forward
//!   filtering and Viterbi decoding side by side
//!
//! Both engines share one grid/cell abstraction. Everything around them
//! (rendering, camera, scene lifecycle) is an external collaborator
//! reached only through the [`viz`] sink.
//!
//! ## Quick Start
//!
//! ```rust
//! use marga_nav::config::LocalizationConfig;
//! use marga_nav::core::{CellCoord, MoveCommand, TerrainReading};
//! use marga_nav::grid::GridModel;
//! use marga_nav::localization::LocalizationEngine;
//! use marga_nav::pathfinding::AStarPlanner;
//!
//! let grid = GridModel::with_unit_cells(10, 10);
//!
//! // Plan a route between two cell centers.
//! let planner = AStarPlanner::with_defaults(&grid);
//! let route = planner.find_path(
//!     CellCoord::new(0, 0),
//!     grid.cell_center(CellCoord::new(9, 9)),
//! );
//! assert!(route.is_success());
//!
//! // Track a belief over the same grid.
//! let mut engine = LocalizationEngine::new(LocalizationConfig::default()).unwrap();
//! engine.setup(&grid);
//! let outcome = engine
//!     .tick(&grid, MoveCommand::Right, TerrainReading::Normal)
//!     .unwrap();
//! assert_eq!(engine.map_path().len(), outcome.ticks);
//! ```
//!
//! ## Coordinate Frame
//!
//! Cells are addressed as `(row, col)` with row 0 at the north edge;
//! north decreases the row, east increases the column. World coordinates
//! put `x` east and `y` south, so cell `(r, c)` covers the world square
//! `origin + (c..c+1, r..r+1) * cell_size`.
//!
//! ## Architecture
//!
//! - [`core`]: fundamental types (coordinates, terrain, commands)
//! - [`grid`]: terrain storage and adjacency queries
//! - [`pathfinding`]: A* planner and its cost model
//! - [`localization`]: belief filter, Viterbi trellis, motion/sensor models
//! - [`trace`]: recorded runs (generate, serialize, replay, score)
//! - [`config`]: typed configuration with YAML loading
//! - [`viz`]: observability sink (no-op unless a collaborator attaches)
//!
//! ## Tick Model
//!
//! All belief updates happen inside one synchronous tick: the host issues
//! a movement command, obtains a terrain reading (live or replayed from a
//! [`trace::Trace`]), and feeds both to
//! [`localization::LocalizationEngine::tick`]. Each tick is computed from
//! the previous tick's snapshot into a fresh buffer, then swapped in, so
//! a pass never observes its own partial writes.

pub mod config;
pub mod core;
pub mod grid;
pub mod localization;
pub mod pathfinding;
pub mod trace;
pub mod viz;

// Re-export main types at crate root
pub use config::{ConfigError, LocalizationConfig, MargaConfig};
pub use core::{CellCoord, Direction, MoveCommand, TerrainClass, TerrainReading, WorldPoint};
pub use grid::{GridError, GridModel};
pub use localization::{LocalizationEngine, LocalizationError, Phase, TickOutcome};
pub use pathfinding::{AStarConfig, AStarPlanner, PathFailure, PathResult};
pub use trace::{Trace, TraceError, TraceGenerator};
pub use viz::{NullSink, VizSink};
