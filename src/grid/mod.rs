//! Terrain grid storage.
//!
//! - [`GridModel`]: fixed-size terrain grid with adjacency queries,
//!   world/cell coordinate conversion and a generation counter for
//!   staleness detection

mod model;

use thiserror::Error;

use crate::core::CellCoord;

pub use model::GridModel;

/// Errors raised by grid construction and terrain edits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("coordinate {coord} is outside the grid")]
    InvalidCoordinate { coord: CellCoord },

    #[error("map has no rows or no columns")]
    EmptyMap,

    #[error("map row {row} does not have {expected} columns")]
    RaggedRow { row: usize, expected: usize },

    #[error("unknown terrain character '{found}' at row {row}, column {col}")]
    InvalidChar { row: usize, col: usize, found: char },
}
