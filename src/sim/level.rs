//! Level definitions and their JSON export/import format
//!
//! A level is static content: a grid of digit rows plus spawn tables.
//! Everything here is plain data so the editor and the built-in tables
//! produce the exact same shape.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::pickup::PickupKind;
use super::tile::Tile;

/// Validation limits to keep imported levels bounded
pub mod limits {
    /// Maximum width or height of a level, in tiles
    pub const MAX_DIMENSION: u32 = 1024;
    /// Maximum number of placed entities of each kind
    pub const MAX_SPAWNS: usize = 512;
    /// Maximum level name length
    pub const MAX_NAME_LEN: usize = 128;
}

/// A position in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Enemy placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub x: i32,
    pub y: i32,
}

/// Pickup placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    #[serde(rename = "type")]
    pub kind: PickupKind,
    pub x: i32,
    pub y: i32,
}

/// A complete level definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub name: String,
    pub player_start: TilePoint,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub pickups: Vec<PickupSpawn>,
    #[serde(default)]
    pub checkpoints: Vec<TilePoint>,
    /// Rows top to bottom, one digit per tile
    pub data: Vec<String>,
}

/// Error type for level validation and import
#[derive(Debug)]
pub enum LevelError {
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
    Dimensions { width: u32, height: u32 },
    RowCount { expected: u32, found: usize },
    RowWidth { row: usize, expected: u32, found: usize },
    InvalidTile { row: usize, col: usize, found: char },
    OutOfBounds { what: &'static str, x: i32, y: i32 },
    TooMany { what: &'static str, count: usize },
    NameTooLong(usize),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Parse(e) => write!(f, "Parse error: {}", e),
            LevelError::Serialize(e) => write!(f, "Serialize error: {}", e),
            LevelError::Dimensions { width, height } => {
                write!(f, "Invalid dimensions {}x{}", width, height)
            }
            LevelError::RowCount { expected, found } => {
                write!(f, "Expected {} rows, found {}", expected, found)
            }
            LevelError::RowWidth { row, expected, found } => {
                write!(f, "Row {} has {} tiles, expected {}", row, found, expected)
            }
            LevelError::InvalidTile { row, col, found } => {
                write!(f, "Invalid tile '{}' at row {}, column {}", found, row, col)
            }
            LevelError::OutOfBounds { what, x, y } => {
                write!(f, "{} at ({}, {}) is outside the map", what, x, y)
            }
            LevelError::TooMany { what, count } => {
                write!(f, "Too many {} ({} > {})", what, count, limits::MAX_SPAWNS)
            }
            LevelError::NameTooLong(len) => {
                write!(f, "Level name too long ({} > {})", len, limits::MAX_NAME_LEN)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Parse(e) | LevelError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl Level {
    /// An empty level of the given size enclosed by solid walls
    pub fn bordered(name: impl Into<String>, width: u32, height: u32) -> Self {
        let width = width.max(3);
        let height = height.max(3);
        let wall: String = std::iter::repeat_n(Tile::Solid.to_char(), width as usize).collect();
        let mut inner = String::with_capacity(width as usize);
        inner.push(Tile::Solid.to_char());
        inner.extend(std::iter::repeat_n(Tile::Empty.to_char(), width as usize - 2));
        inner.push(Tile::Solid.to_char());

        let mut data = Vec::with_capacity(height as usize);
        data.push(wall.clone());
        for _ in 1..height - 1 {
            data.push(inner.clone());
        }
        data.push(wall);

        Self {
            name: name.into(),
            player_start: TilePoint::new(1, height as i32 - 2),
            width,
            height,
            enemies: Vec::new(),
            pickups: Vec::new(),
            checkpoints: Vec::new(),
            data,
        }
    }

    /// Whether a tile coordinate lies inside the grid
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Check every structural invariant of the level
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.name.len() > limits::MAX_NAME_LEN {
            return Err(LevelError::NameTooLong(self.name.len()));
        }
        if self.width == 0
            || self.height == 0
            || self.width > limits::MAX_DIMENSION
            || self.height > limits::MAX_DIMENSION
        {
            return Err(LevelError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.data.len() != self.height as usize {
            return Err(LevelError::RowCount {
                expected: self.height,
                found: self.data.len(),
            });
        }
        for (row, line) in self.data.iter().enumerate() {
            let found = line.chars().count();
            if found != self.width as usize {
                return Err(LevelError::RowWidth {
                    row,
                    expected: self.width,
                    found,
                });
            }
            if let Some((col, c)) = line.chars().enumerate().find(|(_, c)| Tile::from_char(*c).is_none()) {
                return Err(LevelError::InvalidTile { row, col, found: c });
            }
        }

        if !self.contains(self.player_start.x, self.player_start.y) {
            return Err(LevelError::OutOfBounds {
                what: "Player start",
                x: self.player_start.x,
                y: self.player_start.y,
            });
        }

        check_spawns("enemies", self.enemies.iter().map(|e| (e.x, e.y)), self)?;
        check_spawns("pickups", self.pickups.iter().map(|p| (p.x, p.y)), self)?;
        check_spawns("checkpoints", self.checkpoints.iter().map(|c| (c.x, c.y)), self)?;

        Ok(())
    }

    /// Serialize to the portable JSON export format
    pub fn to_json(&self) -> Result<String, LevelError> {
        serde_json::to_string_pretty(self).map_err(LevelError::Serialize)
    }

    /// Parse and validate a level from the JSON export format
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json).map_err(LevelError::Parse)?;
        level.validate()?;
        Ok(level)
    }
}

fn check_spawns(
    what: &'static str,
    points: impl ExactSizeIterator<Item = (i32, i32)>,
    level: &Level,
) -> Result<(), LevelError> {
    if points.len() > limits::MAX_SPAWNS {
        return Err(LevelError::TooMany {
            what,
            count: points.len(),
        });
    }
    for (x, y) in points {
        if !level.contains(x, y) {
            return Err(LevelError::OutOfBounds { what, x, y });
        }
    }
    Ok(())
}
