//! Tile codes
//!
//! One cell of the level grid. Each tile serializes as a single decimal digit.

use serde::{Deserialize, Serialize};

/// Collision class of a map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    /// Blocks movement on all sides
    Solid,
    /// One-way: blocks only bodies falling onto its top
    Platform,
    /// Passable, damages on contact
    Spikes,
    /// Decoration, never collides
    Background,
    /// Completes the level on contact
    Exit,
}

impl Tile {
    pub const ALL: [Tile; 6] = [
        Tile::Empty,
        Tile::Solid,
        Tile::Platform,
        Tile::Spikes,
        Tile::Background,
        Tile::Exit,
    ];

    /// Numeric tile code
    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Solid => 1,
            Tile::Platform => 2,
            Tile::Spikes => 3,
            Tile::Background => 4,
            Tile::Exit => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Solid),
            2 => Some(Tile::Platform),
            3 => Some(Tile::Spikes),
            4 => Some(Tile::Background),
            5 => Some(Tile::Exit),
            _ => None,
        }
    }

    /// Parse a tile from its digit character
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Self::from_code(d as u8))
    }

    pub fn to_char(self) -> char {
        char::from(b'0' + self.code())
    }

    /// Blocks movement from every direction
    pub fn is_solid(self) -> bool {
        self == Tile::Solid
    }

    /// Can be stood on (solid or one-way platform)
    pub fn is_standable(self) -> bool {
        matches!(self, Tile::Solid | Tile::Platform)
    }
}
