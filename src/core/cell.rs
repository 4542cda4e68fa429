//! Terrain classes for grid cells.
//!
//! Every cell carries one terrain class that determines both its traversal
//! cost for path planning and its sensor signature for localization.

use serde::{Deserialize, Serialize};

/// Terrain class of a grid cell.
///
/// The class hierarchy:
/// - `Highway` - paved corridor, cheapest to traverse
/// - `Normal` - ordinary walkable ground
/// - `Difficult` - walkable but slow (rubble, swamp)
/// - `Blocked` - not traversable, never carries probability mass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainClass {
    /// Low-cost corridor cell
    Highway = 0,

    /// Ordinary walkable cell
    #[default]
    Normal = 1,

    /// High-cost walkable cell
    Difficult = 2,

    /// Impassable cell
    Blocked = 3,
}

impl TerrainClass {
    /// Number of classes a sensor can report (Blocked is never read).
    pub const OBSERVABLE_COUNT: usize = 3;

    /// Can an agent stand on this cell?
    #[inline]
    pub fn is_walkable(self) -> bool {
        self != TerrainClass::Blocked
    }

    /// Base traversal difficulty, before any highway discount.
    ///
    /// Highway shares Normal's difficulty here; its discount is applied
    /// per-edge by the cost model, not per-cell.
    #[inline]
    pub fn difficulty(self) -> f64 {
        match self {
            TerrainClass::Highway | TerrainClass::Normal => 1.0,
            TerrainClass::Difficult => 2.0,
            TerrainClass::Blocked => f64::INFINITY,
        }
    }

    /// Convert from u8 (for deserialization)
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => TerrainClass::Highway,
            1 => TerrainClass::Normal,
            2 => TerrainClass::Difficult,
            _ => TerrainClass::Blocked,
        }
    }

    /// Single character representation for map files and debugging
    pub fn as_char(self) -> char {
        match self {
            TerrainClass::Highway => 'h',
            TerrainClass::Normal => '.',
            TerrainClass::Difficult => 't',
            TerrainClass::Blocked => '#',
        }
    }

    /// Inverse of [`as_char`](Self::as_char); `None` on unknown characters.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'h' => Some(TerrainClass::Highway),
            '.' => Some(TerrainClass::Normal),
            't' => Some(TerrainClass::Difficult),
            '#' => Some(TerrainClass::Blocked),
            _ => None,
        }
    }
}
