//! Compass directions, movement commands and sensor readings.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell::TerrainClass;
use super::point::CellCoord;

/// Compass direction of a grid-adjacent move (8-connected).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Row/column offset of a unit step in this direction.
    #[inline]
    pub fn offset(self) -> CellCoord {
        match self {
            Direction::North => CellCoord::new(-1, 0),
            Direction::NorthEast => CellCoord::new(-1, 1),
            Direction::East => CellCoord::new(0, 1),
            Direction::SouthEast => CellCoord::new(1, 1),
            Direction::South => CellCoord::new(1, 0),
            Direction::SouthWest => CellCoord::new(1, -1),
            Direction::West => CellCoord::new(0, -1),
            Direction::NorthWest => CellCoord::new(-1, -1),
        }
    }

    /// Is this a diagonal step?
    #[inline]
    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::SouthEast
                | Direction::SouthWest
                | Direction::NorthWest
        )
    }
}

/// Movement command issued to the agent (4-connected).
///
/// `Up` moves north (row - 1), `Down` south, `Left` west, `Right` east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCommand {
    Up,
    Down,
    Left,
    Right,
}

impl MoveCommand {
    /// All four commands.
    pub const ALL: [MoveCommand; 4] = [
        MoveCommand::Up,
        MoveCommand::Down,
        MoveCommand::Left,
        MoveCommand::Right,
    ];

    /// Row/column offset of a successful move.
    #[inline]
    pub fn offset(self) -> CellCoord {
        match self {
            MoveCommand::Up => CellCoord::new(-1, 0),
            MoveCommand::Down => CellCoord::new(1, 0),
            MoveCommand::Left => CellCoord::new(0, -1),
            MoveCommand::Right => CellCoord::new(0, 1),
        }
    }

    /// Single character used in trace files.
    pub fn as_char(self) -> char {
        match self {
            MoveCommand::Up => 'U',
            MoveCommand::Down => 'D',
            MoveCommand::Left => 'L',
            MoveCommand::Right => 'R',
        }
    }

    /// Inverse of [`as_char`](Self::as_char).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(MoveCommand::Up),
            'D' => Some(MoveCommand::Down),
            'L' => Some(MoveCommand::Left),
            'R' => Some(MoveCommand::Right),
            _ => None,
        }
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Terrain class reported by the agent's sensor after a move.
///
/// Blocked cells are never stood on, so the sensor alphabet has only
/// three symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainReading {
    Normal,
    Highway,
    Difficult,
}

impl TerrainReading {
    /// All readings a sensor can produce.
    pub const ALL: [TerrainReading; 3] = [
        TerrainReading::Normal,
        TerrainReading::Highway,
        TerrainReading::Difficult,
    ];

    /// The terrain class this reading claims.
    #[inline]
    pub fn terrain(self) -> TerrainClass {
        match self {
            TerrainReading::Normal => TerrainClass::Normal,
            TerrainReading::Highway => TerrainClass::Highway,
            TerrainReading::Difficult => TerrainClass::Difficult,
        }
    }

    /// Does this reading match the given terrain class?
    #[inline]
    pub fn matches(self, class: TerrainClass) -> bool {
        self.terrain() == class
    }

    /// Reading for a walkable terrain class; `None` for Blocked.
    pub fn of_terrain(class: TerrainClass) -> Option<Self> {
        match class {
            TerrainClass::Normal => Some(TerrainReading::Normal),
            TerrainClass::Highway => Some(TerrainReading::Highway),
            TerrainClass::Difficult => Some(TerrainReading::Difficult),
            TerrainClass::Blocked => None,
        }
    }

    /// Single character used in trace files.
    pub fn as_char(self) -> char {
        match self {
            TerrainReading::Normal => 'N',
            TerrainReading::Highway => 'H',
            TerrainReading::Difficult => 'T',
        }
    }

    /// Inverse of [`as_char`](Self::as_char).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'N' => Some(TerrainReading::Normal),
            'H' => Some(TerrainReading::Highway),
            'T' => Some(TerrainReading::Difficult),
            _ => None,
        }
    }
}

impl fmt::Display for TerrainReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_offsets_are_unit_steps() {
        for dir in Direction::ALL {
            let o = dir.offset();
            assert_eq!(o.row.abs().max(o.col.abs()), 1);
            assert_eq!(dir.is_diagonal(), o.row != 0 && o.col != 0);
        }
    }

    #[test]
    fn test_command_offsets() {
        assert_eq!(MoveCommand::Up.offset(), CellCoord::new(-1, 0));
        assert_eq!(MoveCommand::Down.offset(), CellCoord::new(1, 0));
        assert_eq!(MoveCommand::Left.offset(), CellCoord::new(0, -1));
        assert_eq!(MoveCommand::Right.offset(), CellCoord::new(0, 1));
    }

    #[test]
    fn test_command_char_round_trip() {
        for cmd in MoveCommand::ALL {
            assert_eq!(MoveCommand::from_char(cmd.as_char()), Some(cmd));
        }
        assert_eq!(MoveCommand::from_char('X'), None);
    }

    #[test]
    fn test_reading_char_round_trip() {
        for reading in TerrainReading::ALL {
            assert_eq!(TerrainReading::from_char(reading.as_char()), Some(reading));
        }
        assert_eq!(TerrainReading::from_char('B'), None);
    }

    #[test]
    fn test_reading_terrain_mapping() {
        assert!(TerrainReading::Highway.matches(TerrainClass::Highway));
        assert!(!TerrainReading::Highway.matches(TerrainClass::Normal));
        assert_eq!(TerrainReading::of_terrain(TerrainClass::Blocked), None);
        for reading in TerrainReading::ALL {
            assert_eq!(TerrainReading::of_terrain(reading.terrain()), Some(reading));
        }
    }
}
