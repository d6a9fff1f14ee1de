//! Queryable tile grid
//!
//! Built from a validated [`Level`]. Out-of-range queries always answer
//! [`Tile::Empty`], so collision probes at the map edge degrade to open space.

use super::level::{Level, LevelError};
use super::tile::Tile;
use crate::consts::TILE_SIZE;
use crate::pixel_to_tile;

/// Tolerance used when comparing edges against tile boundaries
pub const EDGE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    /// Row-major tiles
    tiles: Vec<Tile>,
}

impl Tilemap {
    /// A map filled with empty tiles
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width as usize * height as usize],
        }
    }

    /// Parse a level's rows into a grid
    pub fn from_level(level: &Level) -> Result<Self, LevelError> {
        level.validate()?;
        let mut tiles = Vec::with_capacity(level.width as usize * level.height as usize);
        for (row, line) in level.data.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                let tile = Tile::from_char(c).ok_or(LevelError::InvalidTile { row, col, found: c })?;
                tiles.push(tile);
            }
        }
        Ok(Self {
            width: level.width,
            height: level.height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Map width in pixels
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    /// Map height in pixels
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    fn index(&self, tx: i32, ty: i32) -> Option<usize> {
        if tx < 0 || ty < 0 || tx as u32 >= self.width || ty as u32 >= self.height {
            return None;
        }
        Some(ty as usize * self.width as usize + tx as usize)
    }

    /// Tile at a tile coordinate (`Empty` outside the map)
    pub fn tile_at(&self, tx: i32, ty: i32) -> Tile {
        self.index(tx, ty).map(|i| self.tiles[i]).unwrap_or(Tile::Empty)
    }

    /// Tile under a pixel coordinate
    pub fn tile_at_pixel(&self, px: f32, py: f32) -> Tile {
        self.tile_at(pixel_to_tile(px), pixel_to_tile(py))
    }

    /// Whether a pixel lies inside a fully solid tile
    pub fn is_solid_at(&self, px: f32, py: f32) -> bool {
        self.tile_at_pixel(px, py).is_solid()
    }

    /// Whether a point blocks a body.
    ///
    /// `prev_bottom` is the body's bottom edge before this step when the body is
    /// descending; platforms only block when that edge was at or above the
    /// platform's top. Rising or horizontal movers pass `None` and ignore
    /// platforms entirely.
    pub fn is_blocked_at(&self, px: f32, py: f32, prev_bottom: Option<f32>) -> bool {
        let ty = pixel_to_tile(py);
        match self.tile_at(pixel_to_tile(px), ty) {
            Tile::Solid => true,
            Tile::Platform => match prev_bottom {
                Some(bottom) => bottom <= ty as f32 * TILE_SIZE + EDGE_EPSILON,
                None => false,
            },
            _ => false,
        }
    }

    /// Replace a tile. Returns false for out-of-range coordinates.
    pub fn set_tile(&mut self, tx: i32, ty: i32, tile: Tile) -> bool {
        match self.index(tx, ty) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Resize the grid, keeping the overlapping top-left region
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut map = Self::new(width, height);
        for ty in 0..height.min(self.height) as i32 {
            for tx in 0..width.min(self.width) as i32 {
                map.set_tile(tx, ty, self.tile_at(tx, ty));
            }
        }
        map
    }

    /// Encode back into digit rows
    pub fn to_rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|t| t.to_char()).collect())
            .collect()
    }

    /// Visit every tile whose cell overlaps the given pixel rectangle
    pub fn tiles_in_rect(&self, x: f32, y: f32, w: f32, h: f32) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let x0 = pixel_to_tile(x);
        let y0 = pixel_to_tile(y);
        let x1 = pixel_to_tile(x + w - EDGE_EPSILON);
        let y1 = pixel_to_tile(y + h - EDGE_EPSILON);
        (y0..=y1).flat_map(move |ty| (x0..=x1).map(move |tx| (tx, ty, self.tile_at(tx, ty))))
    }

    /// Number of cells holding the given tile
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}
